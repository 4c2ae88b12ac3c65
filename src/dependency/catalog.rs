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

use super::{AssetPolicy, AssetRule, DependencyDescriptor, SourceRule, VERSION_FILE_NAME};
use crate::platform::{Arch, Platform};
use crate::release::ReleaseQuery;

const ARIA2_REPO: &str = "aria2/aria2";
/// aria2 1.35.0, the last upstream release with a macOS build
const ARIA2_MACOS_RELEASE_ID: u64 = 20496544;
const BENTO4_REPO: &str = "axiomatic-systems/Bento4";
const BENTO4_URL_TEMPLATE: &str =
    "https://www.bok.net/Bento4/binaries/Bento4-SDK-{version}.{platform}.zip";
const FFMPEG_WINDOWS_REPO: &str = "GyanD/codexffmpeg";
const FFMPEG_MACOS_INFO: &str = "https://evermeet.cx/ffmpeg/info/ffmpeg/snapshot";
const SHAKA_PACKAGER_REPO: &str = "shaka-project/shaka-packager";
const YT_DLP_REPO: &str = "yt-dlp/yt-dlp";

/// Every managed dependency, in update order.
pub fn catalog() -> Vec<DependencyDescriptor> {
    vec![aria2(), bento4(), ffmpeg(), shaka_packager(), yt_dlp()]
}

pub fn find(name: &str) -> Option<DependencyDescriptor> {
    catalog().into_iter().find(|d| d.name == name)
}

fn aria2() -> DependencyDescriptor {
    DependencyDescriptor {
        name: "aria2",
        display_name: "aria2",
        bin_subdirectory: "aria2",
        version_file_name: VERSION_FILE_NAME,
        sources: vec![
            SourceRule {
                platforms: vec![Platform::MacOs],
                query: ReleaseQuery::PinnedRelease {
                    repo: ARIA2_REPO,
                    id: ARIA2_MACOS_RELEASE_ID,
                },
            },
            SourceRule {
                platforms: vec![Platform::Windows, Platform::Linux],
                query: ReleaseQuery::LatestRelease { repo: ARIA2_REPO },
            },
        ],
        asset_policy: AssetPolicy::Match(vec![
            AssetRule::new(
                Platform::Windows,
                Some(Arch::X86_64),
                r"^aria2-.+-win-64bit-build\d+\.zip$",
            ),
            AssetRule::new(
                Platform::Windows,
                Some(Arch::X86),
                r"^aria2-.+-win-32bit-build\d+\.zip$",
            ),
            AssetRule::new(Platform::MacOs, None, r"^aria2-.+-osx-darwin\.tar\.bz2$"),
        ]),
        executable_names: vec!["bin/aria2c", "aria2c.exe"],
        primary_executable: "aria2c",
        externally_installable_on: vec![Platform::Linux],
        install_hint: Some("https://aria2.github.io/"),
    }
}

fn bento4() -> DependencyDescriptor {
    DependencyDescriptor {
        name: "bento4",
        display_name: "Bento4 (mp4decrypt)",
        bin_subdirectory: "bento4",
        version_file_name: VERSION_FILE_NAME,
        sources: vec![SourceRule {
            platforms: Platform::ALL.to_vec(),
            query: ReleaseQuery::TagList { repo: BENTO4_REPO },
        }],
        asset_policy: AssetPolicy::Template {
            url_template: BENTO4_URL_TEMPLATE,
            platforms: vec![
                (Platform::Windows, "x86_64-microsoft-win32"),
                (Platform::Linux, "x86_64-unknown-linux"),
                (Platform::MacOs, "universal-apple-macosx"),
            ],
        },
        executable_names: vec!["mp4decrypt", "mp4decrypt.exe"],
        primary_executable: "mp4decrypt",
        externally_installable_on: Vec::new(),
        install_hint: None,
    }
}

fn ffmpeg() -> DependencyDescriptor {
    DependencyDescriptor {
        name: "ffmpeg",
        display_name: "FFmpeg",
        bin_subdirectory: "ffmpeg",
        version_file_name: VERSION_FILE_NAME,
        sources: vec![
            SourceRule {
                platforms: vec![Platform::Windows],
                query: ReleaseQuery::LatestRelease {
                    repo: FFMPEG_WINDOWS_REPO,
                },
            },
            SourceRule {
                platforms: vec![Platform::MacOs],
                query: ReleaseQuery::VendorInfo {
                    url: FFMPEG_MACOS_INFO,
                },
            },
        ],
        asset_policy: AssetPolicy::Match(vec![
            AssetRule::new(Platform::Windows, None, r"^ffmpeg-.+-essentials_build\.zip$"),
            AssetRule::new(Platform::MacOs, None, r"^ffmpeg.*\.zip$"),
        ]),
        executable_names: vec!["ffmpeg", "ffmpeg.exe"],
        primary_executable: "ffmpeg",
        externally_installable_on: vec![Platform::Linux],
        install_hint: Some("https://ffmpeg.org/download.html#build-linux"),
    }
}

fn shaka_packager() -> DependencyDescriptor {
    DependencyDescriptor {
        name: "shaka-packager",
        display_name: "Shaka Packager",
        bin_subdirectory: "shaka-packager",
        version_file_name: VERSION_FILE_NAME,
        sources: vec![SourceRule {
            platforms: Platform::ALL.to_vec(),
            query: ReleaseQuery::LatestRelease {
                repo: SHAKA_PACKAGER_REPO,
            },
        }],
        asset_policy: AssetPolicy::Match(vec![
            AssetRule::new(Platform::Linux, Some(Arch::X86_64), r"^packager-linux-x64$"),
            AssetRule::new(Platform::Linux, Some(Arch::Aarch64), r"^packager-linux-arm64$"),
            AssetRule::new(Platform::MacOs, Some(Arch::X86_64), r"^packager-osx-x64$"),
            AssetRule::new(Platform::MacOs, Some(Arch::Aarch64), r"^packager-osx-arm64$"),
            AssetRule::new(Platform::Windows, Some(Arch::X86_64), r"^packager-win-x64\.exe$"),
        ]),
        executable_names: vec!["packager", "packager.exe"],
        primary_executable: "packager",
        externally_installable_on: Vec::new(),
        install_hint: None,
    }
}

fn yt_dlp() -> DependencyDescriptor {
    DependencyDescriptor {
        name: "yt-dlp",
        display_name: "yt-dlp",
        bin_subdirectory: "yt-dlp",
        version_file_name: VERSION_FILE_NAME,
        sources: vec![SourceRule {
            platforms: Platform::ALL.to_vec(),
            query: ReleaseQuery::LatestRelease { repo: YT_DLP_REPO },
        }],
        asset_policy: AssetPolicy::Match(vec![
            AssetRule::new(Platform::Windows, Some(Arch::X86_64), r"^yt-dlp\.exe$"),
            AssetRule::new(Platform::Windows, Some(Arch::X86), r"^yt-dlp_x86\.exe$"),
            AssetRule::new(Platform::Linux, Some(Arch::X86_64), r"^yt-dlp_linux$"),
            AssetRule::new(Platform::Linux, Some(Arch::Aarch64), r"^yt-dlp_linux_aarch64$"),
            AssetRule::new(Platform::Linux, Some(Arch::Arm), r"^yt-dlp_linux_armv7l$"),
            AssetRule::new(Platform::MacOs, None, r"^yt-dlp_macos$"),
        ]),
        executable_names: vec!["yt-dlp", "yt-dlp.exe"],
        primary_executable: "yt-dlp",
        externally_installable_on: Vec::new(),
        install_hint: None,
    }
}
