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

//! Zip and bzip2-compressed tar extraction with path containment checks.

use crate::error::{Result, ToolfetchError};
use crate::platform::file_ops;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    Zip,
    TarBz2,
}

impl ArchiveType {
    /// Classify a file name by its extension. Returns `None` for names that
    /// do not look like a supported archive.
    pub fn from_name(name: &str) -> Option<ArchiveType> {
        let lower = name.to_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveType::Zip)
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") || lower.ends_with(".tbz")
        {
            Some(ArchiveType::TarBz2)
        } else {
            None
        }
    }
}

/// Extract `archive_path` into `destination` and return every regular file
/// written, in archive order.
///
/// Extraction stops at the first entry whose path would land outside
/// `destination`; nothing is written for that entry.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    file_ops::ensure_dir(destination)?;

    let archive_type = detect_archive_type(archive_path)?;
    debug!(
        "Extracting {} as {archive_type:?} into {}",
        archive_path.display(),
        destination.display()
    );

    let extracted = match archive_type {
        ArchiveType::Zip => extract_zip(archive_path, destination)?,
        ArchiveType::TarBz2 => extract_tar_bz2(archive_path, destination)?,
    };

    info!(
        "Extracted {} files from {}",
        extracted.len(),
        archive_path.display()
    );
    Ok(extracted)
}

pub fn detect_archive_type(path: &Path) -> Result<ArchiveType> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some(archive_type) = ArchiveType::from_name(&name) {
        return Ok(archive_type);
    }

    detect_by_content(path)
}

fn detect_by_content(path: &Path) -> Result<ArchiveType> {
    let mut file = File::open(path).map_err(|e| ToolfetchError::filesystem(path, e))?;
    let mut magic_bytes = [0u8; 4];
    file.read_exact(&mut magic_bytes).map_err(|_| {
        ToolfetchError::UnsupportedArchive(format!(
            "cannot read enough bytes to identify {}",
            path.display()
        ))
    })?;

    // ZIP local header, empty archive or spanned marker
    if magic_bytes[0] == 0x50
        && magic_bytes[1] == 0x4b
        && matches!(magic_bytes[2], 0x03 | 0x05 | 0x07)
    {
        return Ok(ArchiveType::Zip);
    }

    if &magic_bytes[..3] == b"BZh" {
        return Ok(ArchiveType::TarBz2);
    }

    Err(ToolfetchError::UnsupportedArchive(format!(
        "{} is neither zip nor tar.bz2",
        path.display()
    )))
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| ToolfetchError::filesystem(archive_path, e))?;
    let mut archive = ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        let relative = validate_entry_path(&entry_name)?;
        let outpath = destination.join(&relative);

        if entry.is_dir() {
            file_ops::ensure_dir(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            file_ops::ensure_dir(parent)?;
        }

        {
            let mut outfile =
                File::create(&outpath).map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
        }

        if let Some(mode) = entry.unix_mode() {
            file_ops::set_permissions_from_mode(&outpath, mode)
                .map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
        }

        extracted.push(outpath);
    }

    Ok(extracted)
}

fn extract_tar_bz2(archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| ToolfetchError::filesystem(archive_path, e))?;
    let decoder = bzip2::read::BzDecoder::new(file);
    let mut archive = TarArchive::new(decoder);
    let mut extracted = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_name = entry.path()?.to_string_lossy().into_owned();
        let relative = validate_entry_path(&entry_name)?;
        let outpath = destination.join(&relative);
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            file_ops::ensure_dir(&outpath)?;
            continue;
        }

        if entry_type.is_symlink() || entry_type.is_hard_link() {
            warn!("Skipping link entry {entry_name} in {}", archive_path.display());
            continue;
        }

        if !entry_type.is_file() && !entry_type.is_gnu_sparse() {
            debug!("Skipping special entry {entry_name} ({entry_type:?})");
            continue;
        }

        if let Some(parent) = outpath.parent() {
            file_ops::ensure_dir(parent)?;
        }

        {
            let mut outfile =
                File::create(&outpath).map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
        }

        if let Ok(mode) = entry.header().mode() {
            file_ops::set_permissions_from_mode(&outpath, mode)
                .map_err(|e| ToolfetchError::filesystem(&outpath, e))?;
        }

        extracted.push(outpath);
    }

    Ok(extracted)
}

/// Reject entries with parent references or absolute roots and return the
/// relative path to join onto the destination.
fn validate_entry_path(entry_name: &str) -> Result<PathBuf> {
    // Archives built on Windows may use backslash separators
    let unified = entry_name.replace('\\', "/");
    let mut relative = PathBuf::new();

    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ToolfetchError::PathTraversal {
                    entry: entry_name.to_string(),
                });
            }
        }
    }

    // A drive-qualified name like "C:evil" is a Normal component on unix
    if unified.len() >= 2 && unified.as_bytes()[1] == b':' {
        return Err(ToolfetchError::PathTraversal {
            entry: entry_name.to_string(),
        });
    }

    Ok(relative)
}
