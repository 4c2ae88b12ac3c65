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

//! Release metadata lookups: GitHub releases, GitHub tag lists and vendor
//! version documents, normalized into [`Release`].

mod client;
mod models;

pub use client::GithubReleaseSource;
pub use models::{Asset, Release, ReleaseQuery, Tag, VendorDownload, VendorInfo};

use crate::error::{Result, ToolfetchError};

/// Archive format preferred from a vendor document.
const VENDOR_ARCHIVE_FORMAT: &str = "zip";

pub trait ReleaseSource: Send + Sync {
    fn fetch_latest_release(&self, repo: &str) -> Result<Release>;

    fn fetch_release(&self, repo: &str, id: u64) -> Result<Release>;

    /// Tags in the order the host returns them (newest first on GitHub).
    fn fetch_tags(&self, repo: &str) -> Result<Vec<Tag>>;

    fn fetch_vendor_info(&self, url: &str) -> Result<VendorInfo>;

    /// Turn any query into a normalized release.
    ///
    /// A tag list yields a release named after its first tag with no assets;
    /// the asset URL is then derived from the tag by the dependency's policy.
    fn resolve(&self, query: &ReleaseQuery) -> Result<Release> {
        match query {
            ReleaseQuery::LatestRelease { repo } => self.fetch_latest_release(repo),
            ReleaseQuery::PinnedRelease { repo, id } => self.fetch_release(repo, *id),
            ReleaseQuery::TagList { repo } => {
                let tags = self.fetch_tags(repo)?;
                let first = tags.into_iter().next().ok_or_else(|| {
                    ToolfetchError::Decode(format!("{repo} has no tags"))
                })?;
                Ok(Release {
                    tag: first.name,
                    assets: Vec::new(),
                })
            }
            ReleaseQuery::VendorInfo { url } => {
                let info = self.fetch_vendor_info(url)?;
                vendor_release(info)
            }
        }
    }
}

fn vendor_release(info: VendorInfo) -> Result<Release> {
    let download = info.download.get(VENDOR_ARCHIVE_FORMAT).ok_or_else(|| {
        ToolfetchError::Decode(format!(
            "vendor document for {} offers no {VENDOR_ARCHIVE_FORMAT} download",
            info.name.as_deref().unwrap_or("dependency")
        ))
    })?;

    let name = download
        .url
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("download.zip")
        .to_string();

    Ok(Release {
        tag: info.version.clone(),
        assets: vec![Asset {
            name,
            download_url: download.url.clone(),
            size: download.size,
            digest: None,
        }],
    })
}
