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

//! Layered configuration: built-in defaults, an optional `toolfetch.toml`,
//! `TOOLFETCH_*` environment variables, then command-line overrides applied by
//! the caller.

use crate::error::{Result, ToolfetchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "toolfetch.toml";
pub const ENV_PREFIX: &str = "TOOLFETCH";

const DEFAULT_INSTALL_ROOT: &str = "bin";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_JOBS: usize = 1;
const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolfetchConfig {
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub updater: UpdaterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub token: Option<String>,

    /// Timeout for release API and vendor document requests.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,

    /// Keep downloaded archives next to the installed binaries.
    #[serde(default)]
    pub keep_archives: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for ToolfetchConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            github: GithubConfig::default(),
            download: DownloadConfig::default(),
            updater: UpdaterConfig::default(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            token: None,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            keep_archives: false,
        }
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }
}

fn default_install_root() -> PathBuf {
    PathBuf::from(DEFAULT_INSTALL_ROOT)
}

fn default_github_api_base() -> String {
    DEFAULT_GITHUB_API_BASE.to_string()
}

fn default_api_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_jobs() -> usize {
    DEFAULT_JOBS
}

fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

impl ToolfetchConfig {
    /// Load configuration from `explicit_path` (which must exist) or from
    /// `./toolfetch.toml` when present, then apply `TOOLFETCH_*` variables.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file_source = match explicit_path {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true)
            }
            None => config::File::from(Path::new(CONFIG_FILE_NAME))
                .format(config::FileFormat::Toml)
                .required(false),
        };

        let settings = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ToolfetchError::ConfigError(e.to_string()))?;

        let loaded: ToolfetchConfig = settings
            .try_deserialize()
            .map_err(|e| ToolfetchError::ConfigError(e.to_string()))?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.updater.jobs == 0 {
            return Err(ToolfetchError::ConfigError(
                "updater.jobs must be at least 1".to_string(),
            ));
        }
        if self.download.timeout_secs == 0 {
            return Err(ToolfetchError::ConfigError(
                "download.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.github.timeout_secs == 0 {
            return Err(ToolfetchError::ConfigError(
                "github.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.github.api_base.trim().is_empty() {
            return Err(ToolfetchError::ConfigError(
                "github.api_base must not be empty".to_string(),
            ));
        }
        if self.install_root.as_os_str().is_empty() {
            return Err(ToolfetchError::ConfigError(
                "install_root must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_secs)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.updater.lock_timeout_secs)
    }

    /// The GitHub token, ignoring blank values.
    pub fn github_token(&self) -> Option<&str> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
