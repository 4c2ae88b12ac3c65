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

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use toolfetch::download::AttohttpcClient;
use toolfetch::installer::InstallContext;
use toolfetch::locking::CancellationToken;
use toolfetch::platform::{Arch, Platform};
use toolfetch::release::GithubReleaseSource;

/// Install context wired to a local mock server for both the release API and
/// the asset downloads.
pub fn context_for(server_url: &str, root: &Path, platform: Platform, arch: Arch) -> InstallContext {
    InstallContext {
        install_root: root.to_path_buf(),
        platform,
        arch,
        keep_archives: false,
        lock_timeout: Duration::from_secs(10),
        force: false,
        no_progress: true,
        jobs: 1,
        releases: Arc::new(GithubReleaseSource::new(server_url, None)),
        http_client: Arc::new(AttohttpcClient::with_timeout(Duration::from_secs(10))),
        cancel: CancellationToken::new(),
    }
}

pub fn install_root() -> TempDir {
    TempDir::new().expect("Failed to create install root")
}

/// GitHub release JSON with one asset per `(name, url, size)`.
pub fn release_json(tag: &str, assets: &[(&str, &str, usize)]) -> String {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, url, size)| {
            serde_json::json!({
                "name": name,
                "browser_download_url": url,
                "size": size,
            })
        })
        .collect();
    serde_json::json!({ "tag_name": tag, "assets": assets }).to_string()
}

pub fn seed(root: &Path, dependency: &str, version: &str, executable: &str) {
    let bin_dir = root.join(dependency);
    std::fs::create_dir_all(&bin_dir).unwrap();
    std::fs::write(bin_dir.join(".version"), version).unwrap();
    std::fs::write(bin_dir.join(executable), "old binary").unwrap();
}

pub fn marker(root: &Path, dependency: &str) -> Option<String> {
    std::fs::read_to_string(root.join(dependency).join(".version")).ok()
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o755);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn tar_bz2_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}
