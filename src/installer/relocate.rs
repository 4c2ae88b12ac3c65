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

use crate::dependency::DependencyDescriptor;
use crate::error::{Result, ToolfetchError};
use crate::platform::file_ops;
use log::debug;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STAGING_PREFIX: &str = ".extract-";

/// Fresh extraction directory inside a bin subdirectory. Removed when closed
/// or dropped, so failed installs leave nothing behind.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    pub fn create(bin_dir: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(bin_dir)
            .map_err(|e| ToolfetchError::filesystem(bin_dir, e))?;
        debug!("Created staging directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| ToolfetchError::filesystem(path, e))
    }
}

/// Move every extracted file recognized as one of the dependency's
/// executables into `bin_dir`, replacing older copies. Returns the new paths.
pub fn relocate_executables(
    descriptor: &DependencyDescriptor,
    extracted: &[PathBuf],
    staging_root: &Path,
    bin_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut moved = Vec::new();

    for file in extracted {
        let relative = file.strip_prefix(staging_root).unwrap_or(file);
        if !descriptor.is_executable_path(relative) {
            continue;
        }
        let Some(file_name) = file.file_name() else {
            continue;
        };

        let target = bin_dir.join(file_name);
        file_ops::move_file(file, &target)?;
        file_ops::make_executable(&target).map_err(|e| ToolfetchError::filesystem(&target, e))?;
        debug!(
            "[{}] installed {}",
            descriptor.name,
            target.display()
        );
        moved.push(target);
    }

    Ok(moved)
}
