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

//! Descriptors for the external tools toolfetch keeps installed.
//!
//! Platform differences live here as data: which release query to run, how
//! to pick the asset, and which files in an archive are the executables.

mod catalog;

pub use catalog::{catalog, find};

use crate::platform::{Arch, Platform, file_ops};
use crate::release::ReleaseQuery;
use std::path::{Path, PathBuf};

pub const VERSION_FILE_NAME: &str = ".version";

#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// Stable identifier, also used for lock files and `--only`.
    pub name: &'static str,
    pub display_name: &'static str,
    /// Directory under the install root holding the executables.
    pub bin_subdirectory: &'static str,
    pub version_file_name: &'static str,
    /// First rule listing the running platform wins.
    pub sources: Vec<SourceRule>,
    pub asset_policy: AssetPolicy,
    /// Path suffixes, compared component-wise, that mark an extracted file as
    /// an executable to install.
    pub executable_names: Vec<&'static str>,
    /// File name (without `.exe`) given to single-file assets.
    pub primary_executable: &'static str,
    /// Platforms where the OS package manager provides the tool.
    pub externally_installable_on: Vec<Platform>,
    pub install_hint: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct SourceRule {
    pub platforms: Vec<Platform>,
    pub query: ReleaseQuery,
}

#[derive(Debug, Clone)]
pub enum AssetPolicy {
    /// Pick the first release asset whose name matches the rule for the
    /// running platform and architecture.
    Match(Vec<AssetRule>),
    /// Build the download URL from the release tag. `{version}` and
    /// `{platform}` are substituted.
    Template {
        url_template: &'static str,
        platforms: Vec<(Platform, &'static str)>,
    },
}

#[derive(Debug, Clone)]
pub struct AssetRule {
    pub platform: Platform,
    /// `None` matches every architecture.
    pub arch: Option<Arch>,
    /// Regular expression over the asset name.
    pub pattern: &'static str,
}

impl AssetRule {
    pub fn new(platform: Platform, arch: Option<Arch>, pattern: &'static str) -> Self {
        Self {
            platform,
            arch,
            pattern,
        }
    }

    pub fn applies_to(&self, platform: Platform, arch: Arch) -> bool {
        self.platform == platform && self.arch.is_none_or(|a| a == arch)
    }
}

impl DependencyDescriptor {
    pub fn bin_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join(self.bin_subdirectory)
    }

    pub fn is_external_on(&self, platform: Platform) -> bool {
        self.externally_installable_on.contains(&platform)
    }

    pub fn source_for(&self, platform: Platform) -> Option<&ReleaseQuery> {
        self.sources
            .iter()
            .find(|rule| rule.platforms.contains(&platform))
            .map(|rule| &rule.query)
    }

    /// File name used when a release asset is the executable itself.
    pub fn primary_file_name(&self, platform: Platform) -> String {
        match platform {
            Platform::Windows => format!("{}.exe", self.primary_executable),
            _ => self.primary_executable.to_string(),
        }
    }

    /// Names an executable has once moved into the bin directory.
    pub fn installed_file_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .executable_names
            .iter()
            .filter_map(|suffix| suffix.rsplit('/').next())
            .collect();
        names.dedup();
        names
    }

    /// True when `path` ends with one of the executable suffixes.
    pub fn is_executable_path(&self, path: &Path) -> bool {
        self.executable_names
            .iter()
            .any(|suffix| path.ends_with(Path::new(suffix)))
    }

    /// First installed executable found in the bin directory.
    pub fn installed_executable(&self, install_root: &Path) -> Option<PathBuf> {
        let bin_dir = self.bin_dir(install_root);
        self.installed_file_names()
            .into_iter()
            .map(|name| bin_dir.join(name))
            .find(|path| file_ops::file_exists(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor() -> DependencyDescriptor {
        find("aria2").unwrap()
    }

    #[test]
    fn test_bin_dir() {
        let d = descriptor();
        assert_eq!(d.bin_dir(Path::new("bin")), PathBuf::from("bin").join("aria2"));
    }

    #[test]
    fn test_is_executable_path_is_component_wise() {
        let d = descriptor();
        assert!(d.is_executable_path(Path::new("/tmp/x/aria2-1.35.0/bin/aria2c")));
        assert!(d.is_executable_path(Path::new("/tmp/x/aria2-1.37.0-win-64bit-build1/aria2c.exe")));
        assert!(!d.is_executable_path(Path::new("/tmp/x/aria2-1.35.0/share/aria2c")));
        assert!(!d.is_executable_path(Path::new("/tmp/x/notbin/aria2c")));
    }

    #[test]
    fn test_installed_file_names() {
        let d = descriptor();
        assert_eq!(d.installed_file_names(), vec!["aria2c", "aria2c.exe"]);
    }

    #[test]
    fn test_installed_executable() {
        let temp_dir = TempDir::new().unwrap();
        let d = descriptor();
        assert_eq!(d.installed_executable(temp_dir.path()), None);

        let bin_dir = d.bin_dir(temp_dir.path());
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join("aria2c"), "bin").unwrap();
        assert_eq!(
            d.installed_executable(temp_dir.path()),
            Some(bin_dir.join("aria2c"))
        );
    }

    #[test]
    fn test_source_for_platform() {
        let d = descriptor();
        assert!(matches!(
            d.source_for(Platform::MacOs),
            Some(ReleaseQuery::PinnedRelease { .. })
        ));
        assert!(matches!(
            d.source_for(Platform::Windows),
            Some(ReleaseQuery::LatestRelease { .. })
        ));
    }

    #[test]
    fn test_primary_file_name() {
        let d = find("yt-dlp").unwrap();
        assert_eq!(d.primary_file_name(Platform::Windows), "yt-dlp.exe");
        assert_eq!(d.primary_file_name(Platform::Linux), "yt-dlp");
    }

    #[test]
    fn test_asset_rule_applies_to() {
        let any_arch = AssetRule::new(Platform::MacOs, None, "x");
        assert!(any_arch.applies_to(Platform::MacOs, Arch::Aarch64));
        assert!(!any_arch.applies_to(Platform::Linux, Arch::Aarch64));

        let x64 = AssetRule::new(Platform::Linux, Some(Arch::X86_64), "x");
        assert!(x64.applies_to(Platform::Linux, Arch::X86_64));
        assert!(!x64.applies_to(Platform::Linux, Arch::Arm));
    }
}
