// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolfetchError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Remote server returned HTTP {status}")]
    Remote { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No release asset of '{dependency}' matches {platform}/{arch}")]
    AssetNotFound {
        dependency: String,
        platform: String,
        arch: String,
    },

    #[error("Cannot derive a version from tag '{0}'")]
    InvalidTag(String),

    #[error("Archive entry '{entry}' escapes the extraction directory")]
    PathTraversal { entry: String },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),


    #[error("Filesystem operation failed on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Incomplete download: expected {expected} bytes, received {actual}")]
    IncompleteWrite { expected: u64, actual: u64 },

    #[error("Checksum verification failed")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("No executable for '{dependency}' found in {archive}")]
    ExecutableNotFound { dependency: String, archive: String },

    #[error("'{name}' is expected to be installed by the system but was not found in PATH")]
    ExternalDependencyMissing {
        name: String,
        hint: Option<String>,
    },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Timed out after {waited_secs:.1}s waiting for lock on {scope}")]
    LockTimeout { scope: String, waited_secs: f64 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Worker checking '{0}' stopped before reporting a result")]
    WorkerFailed(String),

    #[error("Dependency check failed for: {}", .0.join(", "))]
    DependenciesFailed(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl ToolfetchError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolfetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn is_security_event(&self) -> bool {
        matches!(self, ToolfetchError::PathTraversal { .. })
    }
}

impl From<attohttpc::Error> for ToolfetchError {
    fn from(err: attohttpc::Error) -> Self {
        ToolfetchError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToolfetchError>;
