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

//! Runs the installer over a set of dependencies and collects the results.

use crate::dependency::DependencyDescriptor;
use crate::error::{Result, ToolfetchError};
use crate::installer::{self, InstallContext, InstallOutcome, InstallState, InstallStatus};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Outcomes in the order the dependencies were given.
#[derive(Debug)]
pub struct UpdateReport {
    pub outcomes: Vec<InstallOutcome>,
}

impl UpdateReport {
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_success())
            .map(|outcome| outcome.dependency.as_str())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(InstallOutcome::is_success)
    }

    /// `DependenciesFailed` naming every dependency that is not usable.
    pub fn into_result(self) -> Result<Vec<InstallOutcome>> {
        let failed: Vec<String> = self.failed().into_iter().map(str::to_string).collect();
        if failed.is_empty() {
            Ok(self.outcomes)
        } else {
            Err(ToolfetchError::DependenciesFailed(failed))
        }
    }
}

pub struct Updater<'a> {
    context: &'a InstallContext,
    search_path: Option<OsString>,
}

impl<'a> Updater<'a> {
    pub fn new(context: &'a InstallContext) -> Self {
        Self {
            context,
            search_path: None,
        }
    }

    /// Look up system-provided tools in `path` instead of `PATH`.
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn run(&self, descriptors: &[DependencyDescriptor]) -> UpdateReport {
        let jobs = self.context.jobs.clamp(1, descriptors.len().max(1));
        info!(
            "Checking {} dependencies with {jobs} job(s)",
            descriptors.len()
        );

        let outcomes = if jobs == 1 {
            descriptors.iter().map(|d| self.check_one(d)).collect()
        } else {
            self.run_parallel(descriptors, jobs)
        };

        UpdateReport { outcomes }
    }

    fn run_parallel(&self, descriptors: &[DependencyDescriptor], jobs: usize) -> Vec<InstallOutcome> {
        let cursor = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<InstallOutcome>>> =
            Mutex::new(descriptors.iter().map(|_| None).collect());

        thread::scope(|scope| {
            for worker in 0..jobs {
                let cursor = &cursor;
                let slots = &slots;
                scope.spawn(move || {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(descriptor) = descriptors.get(index) else {
                            break;
                        };
                        debug!("worker {worker} picked {}", descriptor.name);
                        let outcome = self.check_one(descriptor);
                        match slots.lock() {
                            Ok(mut slots) => slots[index] = Some(outcome),
                            Err(poisoned) => poisoned.into_inner()[index] = Some(outcome),
                        }
                    }
                });
            }
        });

        let slots = slots.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .into_iter()
            .zip(descriptors)
            .map(|(slot, descriptor)| {
                // A worker that panicked leaves its slot empty
                slot.unwrap_or_else(|| InstallOutcome {
                    dependency: descriptor.name.to_string(),
                    result: Err(ToolfetchError::WorkerFailed(descriptor.name.to_string())),
                    trace: vec![InstallState::Failed("worker stopped".to_string())],
                })
            })
            .collect()
    }

    fn check_one(&self, descriptor: &DependencyDescriptor) -> InstallOutcome {
        if self.context.cancel.is_cancelled() {
            debug!("[{}] skipped after cancellation", descriptor.name);
            return InstallOutcome {
                dependency: descriptor.name.to_string(),
                result: Err(ToolfetchError::Cancelled),
                trace: Vec::new(),
            };
        }

        if descriptor.is_external_on(self.context.platform) {
            return self.check_external(descriptor);
        }

        let outcome = installer::install(self.context, descriptor);
        match &outcome.result {
            Ok(status) => info!("[{}] {status}", descriptor.name),
            Err(e) => warn!("[{}] {e}", descriptor.name),
        }
        outcome
    }

    fn check_external(&self, descriptor: &DependencyDescriptor) -> InstallOutcome {
        let result = self.locate(descriptor.primary_executable).map_or_else(
            || {
                Err(ToolfetchError::ExternalDependencyMissing {
                    name: descriptor.display_name.to_string(),
                    hint: descriptor.install_hint.map(str::to_string),
                })
            },
            |path| {
                debug!("[{}] found on PATH at {}", descriptor.name, path.display());
                Ok(InstallStatus::External { path })
            },
        );

        if let Err(e) = &result {
            warn!("[{}] {e}", descriptor.name);
        }

        InstallOutcome {
            dependency: descriptor.name.to_string(),
            result,
            trace: vec![InstallState::Unchecked],
        }
    }

    fn locate(&self, binary: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(binary, Some(paths), cwd).ok()
            }
            None => which::which(binary).ok(),
        }
    }
}
