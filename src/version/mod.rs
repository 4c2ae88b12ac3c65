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

//! Per-dependency version marker files.

use crate::dependency::DependencyDescriptor;
use crate::error::{Result, ToolfetchError};
use crate::platform::file_ops;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A dependency is outdated when its recorded version sorts byte-wise before
/// the latest published one.
pub fn is_outdated(current: &str, latest: &str) -> bool {
    current < latest
}

/// Reads and writes the raw version string recorded for one dependency.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_dependency(install_root: &Path, descriptor: &DependencyDescriptor) -> Self {
        Self::new(
            descriptor
                .bin_dir(install_root)
                .join(descriptor.version_file_name),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        file_ops::file_exists(&self.path)
    }

    /// The recorded version, verbatim.
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| ToolfetchError::filesystem(&self.path, e))
    }

    /// Like [`read`](Self::read) but a missing marker is `None`.
    pub fn read_optional(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(version) => Ok(Some(version)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ToolfetchError::filesystem(&self.path, e)),
        }
    }

    /// Replace the marker through a temporary file in the same directory.
    pub fn write(&self, version: &str) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        file_ops::ensure_dir(parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| ToolfetchError::filesystem(parent, e))?;
        temp.write_all(version.as_bytes())
            .map_err(|e| ToolfetchError::filesystem(temp.path(), e))?;
        temp.flush()
            .map_err(|e| ToolfetchError::filesystem(temp.path(), e))?;

        #[cfg(windows)]
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| ToolfetchError::filesystem(&self.path, e))?;
        }

        temp.persist(&self.path)
            .map_err(|e| ToolfetchError::filesystem(&self.path, e.error))?;

        debug!("Recorded version {version:?} in {}", self.path.display());
        Ok(())
    }
}
