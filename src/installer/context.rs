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

use crate::config::ToolfetchConfig;
use crate::download::HttpClient;
use crate::error::Result;
use crate::locking::CancellationToken;
use crate::platform::{self, Arch, Platform};
use crate::release::ReleaseSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything an install needs, resolved once per run and shared by all
/// dependencies.
#[derive(Clone)]
pub struct InstallContext {
    pub install_root: PathBuf,
    pub platform: Platform,
    pub arch: Arch,
    pub keep_archives: bool,
    pub lock_timeout: Duration,
    pub force: bool,
    pub no_progress: bool,
    pub jobs: usize,
    pub releases: Arc<dyn ReleaseSource>,
    pub http_client: Arc<dyn HttpClient>,
    pub cancel: CancellationToken,
}

impl InstallContext {
    /// Context for the running platform.
    pub fn from_config(
        config: &ToolfetchConfig,
        releases: Arc<dyn ReleaseSource>,
        http_client: Arc<dyn HttpClient>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        Ok(Self {
            install_root: config.install_root.clone(),
            platform: platform::current_platform()?,
            arch: platform::current_arch()?,
            keep_archives: config.download.keep_archives,
            lock_timeout: config.lock_timeout(),
            force: false,
            no_progress: false,
            jobs: config.updater.jobs,
            releases,
            http_client,
            cancel,
        })
    }

    pub fn with_target(mut self, platform: Platform, arch: Arch) -> Self {
        self.platform = platform;
        self.arch = arch;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}
