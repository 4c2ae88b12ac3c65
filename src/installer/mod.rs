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

//! Brings one dependency's bin subdirectory up to date.
//!
//! The bin subdirectory holds either nothing, or a working executable plus a
//! version marker naming the release it came from. The marker is written last
//! and only after the executable is in place.

mod context;
mod relocate;

pub use context::InstallContext;
pub use relocate::{StagingArea, relocate_executables};

use crate::archive::{self, ArchiveType};
use crate::asset;
use crate::dependency::DependencyDescriptor;
use crate::download::{
    DownloadOptions, DownloadProgressAdapter, HttpFileDownloader, verify_checksum,
};
use crate::error::{Result, ToolfetchError};
use crate::indicator::{ProgressConfig, ProgressFactory, ProgressStyle};
use crate::locking;
use crate::platform::file_ops;
use crate::release::Asset;
use crate::version::{VersionStore, is_outdated};
use log::{debug, error, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Unchecked,
    Missing,
    UpToDate,
    Outdated,
    Downloading,
    Extracting,
    Relocating,
    VersionWritten,
    Failed(String),
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallState::Unchecked => write!(f, "unchecked"),
            InstallState::Missing => write!(f, "missing"),
            InstallState::UpToDate => write!(f, "up-to-date"),
            InstallState::Outdated => write!(f, "outdated"),
            InstallState::Downloading => write!(f, "downloading"),
            InstallState::Extracting => write!(f, "extracting"),
            InstallState::Relocating => write!(f, "relocating"),
            InstallState::VersionWritten => write!(f, "version-written"),
            InstallState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    UpToDate { version: String },
    Installed { version: String },
    Updated { from: String, to: String },
    /// Provided by the operating system and found on PATH.
    External { path: PathBuf },
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::UpToDate { version } => write!(f, "up to date ({version})"),
            InstallStatus::Installed { version } => write!(f, "installed {version}"),
            InstallStatus::Updated { from, to } => write!(f, "updated {from} -> {to}"),
            InstallStatus::External { path } => write!(f, "system ({})", path.display()),
        }
    }
}

/// Result of one dependency check. The trace is kept on failure as well.
#[derive(Debug)]
pub struct InstallOutcome {
    pub dependency: String,
    pub result: Result<InstallStatus>,
    pub trace: Vec<InstallState>,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run the install state machine for `descriptor`.
pub fn install(context: &InstallContext, descriptor: &DependencyDescriptor) -> InstallOutcome {
    let mut installer = DependencyInstaller {
        context,
        descriptor,
        trace: Vec::new(),
    };
    installer.transition(InstallState::Unchecked);

    let result = installer.run();
    if let Err(e) = &result {
        if e.is_security_event() {
            error!(
                "[{}] security: refused archive for {}: {e}",
                descriptor.name, descriptor.display_name
            );
        }
        installer.transition(InstallState::Failed(e.to_string()));
    }

    InstallOutcome {
        dependency: descriptor.name.to_string(),
        result,
        trace: installer.trace,
    }
}

struct DependencyInstaller<'a> {
    context: &'a InstallContext,
    descriptor: &'a DependencyDescriptor,
    trace: Vec<InstallState>,
}

impl DependencyInstaller<'_> {
    fn transition(&mut self, state: InstallState) {
        debug!("[{}] state -> {state}", self.descriptor.name);
        self.trace.push(state);
    }

    fn run(&mut self) -> Result<InstallStatus> {
        let ctx = self.context;
        let name = self.descriptor.name;
        ctx.cancel.check()?;

        let lock = locking::acquire_dependency_lock(
            &ctx.install_root,
            name,
            ctx.lock_timeout,
            &ctx.cancel,
        )?;

        let query = self.descriptor.source_for(ctx.platform).ok_or_else(|| {
            ToolfetchError::UnsupportedPlatform(format!(
                "{name} has no release source for {}",
                ctx.platform
            ))
        })?;
        debug!("[{name}] querying {}", query.describe());
        let release = ctx.releases.resolve(query)?;
        let latest = release.tag.clone();

        let store = VersionStore::for_dependency(&ctx.install_root, self.descriptor);
        let current = store.read_optional()?;
        let has_executable = self.descriptor.installed_executable(&ctx.install_root).is_some();

        match &current {
            None => self.transition(InstallState::Missing),
            Some(_) if ctx.force => {
                debug!("[{name}] reinstall forced");
                self.transition(InstallState::Missing);
            }
            Some(version) if !has_executable => {
                warn!("[{name}] version marker {version} present but no executable found");
                self.transition(InstallState::Missing);
            }
            Some(version) if !is_outdated(version, &latest) => {
                self.transition(InstallState::UpToDate);
                lock.release()?;
                return Ok(InstallStatus::UpToDate {
                    version: version.clone(),
                });
            }
            Some(version) => {
                info!("[{name}] out of date: current {version}, latest {latest}");
                self.transition(InstallState::Outdated);
            }
        }

        let asset = asset::select_asset(self.descriptor, &release, ctx.platform, ctx.arch)?;
        let bin_dir = self.descriptor.bin_dir(&ctx.install_root);
        file_ops::ensure_dir(&bin_dir)?;

        match ArchiveType::from_name(&asset.name) {
            Some(_) => self.install_archive(&asset, &bin_dir)?,
            None => self.install_single_file(&asset, &bin_dir)?,
        }

        ctx.cancel.check()?;
        store.write(&latest)?;
        self.transition(InstallState::VersionWritten);
        lock.release()?;

        Ok(match current {
            Some(from) if has_executable => InstallStatus::Updated { from, to: latest },
            _ => InstallStatus::Installed { version: latest },
        })
    }

    fn install_archive(&mut self, asset: &Asset, bin_dir: &Path) -> Result<()> {
        let name = self.descriptor.name;
        self.transition(InstallState::Downloading);
        let archive_path = bin_dir.join(&asset.name);
        if self.reusable_archive(asset, &archive_path) {
            info!("[{name}] reusing downloaded {}", archive_path.display());
        } else {
            self.download(asset, &archive_path)?;
        }

        self.transition(InstallState::Extracting);
        let staging = StagingArea::create(bin_dir)?;
        let mut progress =
            ProgressFactory::create_for_jobs(self.context.no_progress, self.context.jobs);
        progress.start(ProgressConfig::new(
            "Extracting",
            format!("[{name}] {}", asset.name),
            ProgressStyle::Count,
        ));
        let extracted = match archive::extract_archive(&archive_path, staging.path()) {
            Ok(files) => {
                progress.complete(Some(format!("{} files", files.len())));
                files
            }
            Err(e) => {
                progress.error(e.to_string());
                self.discard_archive(&archive_path);
                return Err(e);
            }
        };

        self.transition(InstallState::Relocating);
        let moved = relocate_executables(self.descriptor, &extracted, staging.path(), bin_dir)?;
        if moved.is_empty() {
            self.discard_archive(&archive_path);
            return Err(ToolfetchError::ExecutableNotFound {
                dependency: name.to_string(),
                archive: asset.name.clone(),
            });
        }
        staging.close()?;

        if self.context.keep_archives {
            debug!("[{name}] keeping {}", archive_path.display());
        } else {
            fs::remove_file(&archive_path)
                .map_err(|e| ToolfetchError::filesystem(&archive_path, e))?;
        }
        Ok(())
    }

    /// Removes an archive whose contents cannot be installed so the next run
    /// downloads it again.
    fn discard_archive(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => debug!(
                "[{}] removed unusable archive {}",
                self.descriptor.name,
                path.display()
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "[{}] failed to remove unusable archive {}: {e}",
                self.descriptor.name,
                path.display()
            ),
        }
    }

    fn install_single_file(&mut self, asset: &Asset, bin_dir: &Path) -> Result<()> {
        self.transition(InstallState::Downloading);
        let target = bin_dir.join(self.descriptor.primary_file_name(self.context.platform));
        self.download(asset, &target)?;

        self.transition(InstallState::Relocating);
        file_ops::make_executable(&target).map_err(|e| ToolfetchError::filesystem(&target, e))
    }

    fn download(&self, asset: &Asset, destination: &Path) -> Result<PathBuf> {
        let ctx = self.context;
        info!(
            "[{}] downloading {} from {}",
            self.descriptor.name, asset.name, asset.download_url
        );
        let reporter = DownloadProgressAdapter::for_asset(
            ctx.no_progress,
            ctx.jobs,
            self.descriptor.name,
            &asset.name,
        );
        HttpFileDownloader::with_client(ctx.http_client.clone())
            .with_progress_reporter(Box::new(reporter))
            .with_cancellation(ctx.cancel.clone())
            .download(
                &asset.download_url,
                destination,
                &DownloadOptions::for_asset(asset),
            )
    }

    /// An archive left by an earlier run is reused when it matches the release
    /// metadata. Archives that failed to install were already removed.
    fn reusable_archive(&self, asset: &Asset, path: &Path) -> bool {
        if !file_ops::file_exists(path) || self.context.force {
            return false;
        }

        if let Some(expected) = asset.sha256() {
            return match verify_checksum(path, expected) {
                Ok(()) => true,
                Err(e) => {
                    debug!("[{}] stale archive: {e}", self.descriptor.name);
                    false
                }
            };
        }

        match (asset.size, fs::metadata(path)) {
            (Some(size), Ok(meta)) => meta.len() == size,
            (None, Ok(_)) => true,
            (_, Err(_)) => false,
        }
    }
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod installer_tests;
