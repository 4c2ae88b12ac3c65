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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the latest version of a dependency is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseQuery {
    /// `GET {api}/repos/{repo}/releases/latest`
    LatestRelease { repo: &'static str },
    /// `GET {api}/repos/{repo}/releases/{id}`
    PinnedRelease { repo: &'static str, id: u64 },
    /// `GET {api}/repos/{repo}/tags`, newest first
    TagList { repo: &'static str },
    /// A vendor JSON document describing the current build
    VendorInfo { url: &'static str },
}

impl ReleaseQuery {
    pub fn describe(&self) -> String {
        match self {
            ReleaseQuery::LatestRelease { repo } => format!("latest release of {repo}"),
            ReleaseQuery::PinnedRelease { repo, id } => format!("release {id} of {repo}"),
            ReleaseQuery::TagList { repo } => format!("newest tag of {repo}"),
            ReleaseQuery::VendorInfo { url } => format!("vendor info at {url}"),
        }
    }
}

/// A release normalized across GitHub releases, tag lists and vendor documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag: String,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub download_url: String,
    pub size: Option<u64>,
    /// `sha256:<hex>` as published by GitHub
    pub digest: Option<String>,
}

impl Asset {
    /// Hex sha256 from the published digest, if any.
    pub fn sha256(&self) -> Option<&str> {
        self.digest
            .as_deref()
            .and_then(|d| d.strip_prefix("sha256:"))
            .filter(|hex| !hex.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub version: String,
    #[serde(default)]
    pub download: HashMap<String, VendorDownload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorDownload {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub sig: Option<String>,
}

// GitHub REST wire shapes

#[derive(Debug, Deserialize)]
pub(crate) struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubTag {
    pub name: String,
    #[serde(default)]
    pub commit: Option<GithubCommit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubCommit {
    pub sha: String,
}

impl From<GithubRelease> for Release {
    fn from(release: GithubRelease) -> Self {
        Release {
            tag: release.tag_name,
            assets: release
                .assets
                .into_iter()
                .map(|a| Asset {
                    name: a.name,
                    download_url: a.browser_download_url,
                    size: a.size,
                    digest: a.digest,
                })
                .collect(),
        }
    }
}

impl From<GithubTag> for Tag {
    fn from(tag: GithubTag) -> Self {
        Tag {
            name: tag.name,
            commit_sha: tag.commit.map(|c| c.sha),
        }
    }
}
