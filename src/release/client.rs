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
use crate::release::models::{GithubRelease, GithubTag};
use crate::release::{Release, ReleaseSource, Tag, VendorInfo};
use crate::user_agent;
use attohttpc::Session;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use std::time::Duration;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Release source backed by the GitHub REST API. Vendor documents are fetched
/// with the same session but without GitHub credentials.
pub struct GithubReleaseSource {
    api_base: String,
    session: Session,
    vendor_session: Session,
}

impl GithubReleaseSource {
    pub fn new(api_base: &str, token: Option<&str>) -> Self {
        let mut session = Session::new();
        session.header("User-Agent", user_agent::release_client());
        session.header("Accept", GITHUB_ACCEPT);
        session.timeout(DEFAULT_TIMEOUT);
        session.proxy_settings(attohttpc::ProxySettings::from_env());
        if let Some(token) = token {
            session.header("Authorization", format!("Bearer {token}"));
        }

        let mut vendor_session = Session::new();
        vendor_session.header("User-Agent", user_agent::release_client());
        vendor_session.timeout(DEFAULT_TIMEOUT);
        vendor_session.proxy_settings(attohttpc::ProxySettings::from_env());

        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            session,
            vendor_session,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.session.timeout(timeout);
        self.vendor_session.timeout(timeout);
        self
    }

    fn get_json<T: DeserializeOwned>(session: &Session, url: &str) -> Result<T> {
        debug!("GET {url}");
        let response = session.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ToolfetchError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        trace!("Response from {url}: {body}");
        serde_json::from_str(&body)
            .map_err(|e| ToolfetchError::Decode(format!("Failed to parse {url}: {e}")))
    }
}

impl ReleaseSource for GithubReleaseSource {
    fn fetch_latest_release(&self, repo: &str) -> Result<Release> {
        let url = format!("{}/repos/{repo}/releases/latest", self.api_base);
        let release: GithubRelease = Self::get_json(&self.session, &url)?;
        Ok(release.into())
    }

    fn fetch_release(&self, repo: &str, id: u64) -> Result<Release> {
        let url = format!("{}/repos/{repo}/releases/{id}", self.api_base);
        let release: GithubRelease = Self::get_json(&self.session, &url)?;
        Ok(release.into())
    }

    fn fetch_tags(&self, repo: &str) -> Result<Vec<Tag>> {
        let url = format!("{}/repos/{repo}/tags", self.api_base);
        let tags: Vec<GithubTag> = Self::get_json(&self.session, &url)?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    fn fetch_vendor_info(&self, url: &str) -> Result<VendorInfo> {
        Self::get_json(&self.vendor_session, url)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
