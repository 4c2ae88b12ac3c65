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

use crate::error::{Result, ToolfetchError};
use crate::locking::{CancellationToken, LOCKS_DIR};
use crate::platform::file_ops;
use log::{debug, warn};
use std::cmp;
use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Exponential sleep schedule used while a lock is contended.
#[derive(Debug, Clone)]
pub struct PollingBackoff {
    factor: u32,
    cap: Duration,
    current: Duration,
}

impl PollingBackoff {
    pub fn new(initial: Duration, factor: u32, cap: Duration) -> Self {
        Self {
            factor: cmp::max(factor, 1),
            cap,
            current: initial,
        }
    }

    /// Returns the current delay and advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = cmp::min(self.current.saturating_mul(self.factor), self.cap);
        delay
    }
}

impl Default for PollingBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(10), 2, Duration::from_millis(1_100))
    }
}

/// Exclusive advisory lock on one dependency's lock file. Released on drop.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    file: Option<File>,
    acquired_at: Instant,
}

impl LockHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<()> {
        self.unlock()
    }

    fn unlock(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| ToolfetchError::filesystem(&self.path, e))?;
            debug!(
                "Released lock {} after {:.3}s",
                self.path.display(),
                self.acquired_at.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(err) = self.unlock() {
            warn!("Failed to release lock {}: {err}", self.path.display());
        }
    }
}

pub fn lock_path_for(install_root: &Path, dependency: &str) -> PathBuf {
    install_root.join(LOCKS_DIR).join(format!("{dependency}.lock"))
}

/// Take the exclusive lock for `dependency`, polling until `timeout` elapses
/// or `cancel` is raised.
pub fn acquire_dependency_lock(
    install_root: &Path,
    dependency: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<LockHandle> {
    let path = lock_path_for(install_root, dependency);
    if let Some(parent) = path.parent() {
        file_ops::ensure_dir(parent)?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| ToolfetchError::filesystem(&path, e))?;

    let started = Instant::now();
    let mut backoff = PollingBackoff::default();

    loop {
        match file.try_lock() {
            Ok(()) => {
                debug!(
                    "Acquired lock {} after {:.3}s",
                    path.display(),
                    started.elapsed().as_secs_f64()
                );
                return Ok(LockHandle {
                    path,
                    file: Some(file),
                    acquired_at: started,
                });
            }
            Err(TryLockError::WouldBlock) => {
                cancel.check()?;
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(ToolfetchError::LockTimeout {
                        scope: dependency.to_string(),
                        waited_secs: waited.as_secs_f64(),
                    });
                }
                let delay = cmp::min(backoff.next_delay(), timeout - waited);
                debug!("Lock {} is busy, retrying in {delay:?}", path.display());
                thread::sleep(delay);
            }
            Err(TryLockError::Error(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(TryLockError::Error(err)) => {
                return Err(ToolfetchError::filesystem(&path, err));
            }
        }
    }
}
