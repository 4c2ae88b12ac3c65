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

//! Picks the single downloadable asset for a dependency on the running
//! platform.

use crate::dependency::{AssetPolicy, DependencyDescriptor};
use crate::error::{Result, ToolfetchError};
use crate::platform::{Arch, Platform};
use crate::release::{Asset, Release};
use log::debug;
use regex::Regex;

pub fn select_asset(
    descriptor: &DependencyDescriptor,
    release: &Release,
    platform: Platform,
    arch: Arch,
) -> Result<Asset> {
    let not_found = || ToolfetchError::AssetNotFound {
        dependency: descriptor.name.to_string(),
        platform: platform.to_string(),
        arch: arch.to_string(),
    };

    match &descriptor.asset_policy {
        AssetPolicy::Match(rules) => {
            let rule = rules
                .iter()
                .find(|rule| rule.applies_to(platform, arch))
                .ok_or_else(not_found)?;
            let pattern = Regex::new(rule.pattern).map_err(|e| {
                ToolfetchError::ConfigError(format!(
                    "invalid asset pattern for {}: {e}",
                    descriptor.name
                ))
            })?;

            let asset = release
                .assets
                .iter()
                .find(|asset| pattern.is_match(&asset.name))
                .cloned()
                .ok_or_else(not_found)?;

            debug!(
                "{}: selected asset {} for {platform}/{arch}",
                descriptor.name, asset.name
            );
            Ok(asset)
        }
        AssetPolicy::Template {
            url_template,
            platforms,
        } => {
            let keyword = platforms
                .iter()
                .find(|(p, _)| *p == platform)
                .map(|(_, keyword)| *keyword)
                .ok_or_else(not_found)?;
            let version = parse_tag_version(&release.tag)?;

            let download_url = url_template
                .replace("{version}", &version)
                .replace("{platform}", keyword);
            let name = download_url
                .rsplit('/')
                .next()
                .unwrap_or(&download_url)
                .to_string();

            debug!(
                "{}: derived asset {download_url} from tag {}",
                descriptor.name, release.tag
            );
            Ok(Asset {
                name,
                download_url,
                size: None,
                digest: None,
            })
        }
    }
}

/// Turn a `v`-prefixed tag into the dashed version used in vendor file names,
/// e.g. `v1.6.0-641` becomes `1-6-0-641`.
pub fn parse_tag_version(tag: &str) -> Result<String> {
    let rest = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .ok_or_else(|| ToolfetchError::InvalidTag(tag.to_string()))?;

    if rest.is_empty() {
        return Err(ToolfetchError::InvalidTag(tag.to_string()));
    }

    Ok(rest.replace('.', "-"))
}
