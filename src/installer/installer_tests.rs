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

use super::*;
use crate::dependency;
use crate::download::HttpClient;
use crate::locking::CancellationToken;
use crate::platform::{Arch, Platform};
use crate::release::Release;
use crate::test::fixtures::{StubHttp, StubSource, release, tar_bz2_bytes, zip_bytes};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    root: TempDir,
    http: Arc<StubHttp>,
    context: InstallContext,
}

impl Fixture {
    fn new(release: Release, http: StubHttp, platform: Platform, arch: Arch) -> Self {
        let root = TempDir::new().unwrap();
        let http = Arc::new(http);
        let context = InstallContext {
            install_root: root.path().to_path_buf(),
            platform,
            arch,
            keep_archives: false,
            lock_timeout: Duration::from_secs(5),
            force: false,
            no_progress: true,
            jobs: 1,
            releases: Arc::new(StubSource { release }),
            http_client: http.clone(),
            cancel: CancellationToken::new(),
        };
        Self {
            root,
            http,
            context,
        }
    }

    fn bin_dir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn seed(&self, name: &str, version: &str, executable: Option<&str>) {
        let bin_dir = self.bin_dir(name);
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join(".version"), version).unwrap();
        if let Some(exe) = executable {
            fs::write(bin_dir.join(exe), "old binary").unwrap();
        }
    }

    fn marker(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.bin_dir(name).join(".version")).ok()
    }

    fn gets(&self) -> usize {
        self.http.gets()
    }
}

fn leftover_staging(bin_dir: &Path) -> bool {
    fs::read_dir(bin_dir).unwrap().any(|entry| {
        entry
            .unwrap()
            .file_name()
            .to_string_lossy()
            .starts_with(".extract-")
    })
}

const YT_DLP_URL: &str = "https://example.com/yt-dlp/yt-dlp_linux";

#[test]
fn test_fresh_install_of_single_file_asset() {
    let fixture = Fixture::new(
        release(
            "2024.08.06",
            &[
                ("yt-dlp.exe", "https://example.com/yt-dlp.exe"),
                ("yt-dlp_linux", YT_DLP_URL),
            ],
        ),
        StubHttp::serving(YT_DLP_URL, b"#!/bin/sh\necho yt-dlp\n".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert_eq!(
        outcome.result.unwrap(),
        InstallStatus::Installed {
            version: "2024.08.06".to_string()
        }
    );
    assert_eq!(
        outcome.trace,
        vec![
            InstallState::Unchecked,
            InstallState::Missing,
            InstallState::Downloading,
            InstallState::Relocating,
            InstallState::VersionWritten,
        ]
    );

    let executable = fixture.bin_dir("yt-dlp").join("yt-dlp");
    assert_eq!(
        fs::read_to_string(&executable).unwrap(),
        "#!/bin/sh\necho yt-dlp\n"
    );
    assert!(file_ops::is_executable(&executable).unwrap());
    assert_eq!(fixture.marker("yt-dlp").as_deref(), Some("2024.08.06"));
}

#[test]
fn test_up_to_date_makes_no_download() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::serving(YT_DLP_URL, b"new".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("yt-dlp", "2024.08.06", Some("yt-dlp"));
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert_eq!(
        outcome.result.unwrap(),
        InstallStatus::UpToDate {
            version: "2024.08.06".to_string()
        }
    );
    assert_eq!(
        outcome.trace,
        vec![InstallState::Unchecked, InstallState::UpToDate]
    );
    assert_eq!(fixture.gets(), 0);
    assert_eq!(
        fs::read_to_string(fixture.bin_dir("yt-dlp").join("yt-dlp")).unwrap(),
        "old binary"
    );
}

#[test]
fn test_newer_local_version_counts_as_up_to_date() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::default(),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("yt-dlp", "2025.01.01", Some("yt-dlp"));
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);
    assert!(matches!(outcome.result, Ok(InstallStatus::UpToDate { .. })));
    assert_eq!(fixture.marker("yt-dlp").as_deref(), Some("2025.01.01"));
}

#[test]
fn test_outdated_archive_is_replaced() {
    let url = "https://example.com/aria2-1.36.0-osx-darwin.tar.bz2";
    let archive = tar_bz2_bytes(&[
        ("aria2-1.36.0/bin/aria2c", b"aria2c 1.36.0"),
        ("aria2-1.36.0/README.html", b"docs"),
    ]);
    let fixture = Fixture::new(
        release("release-1.36.0", &[("aria2-1.36.0-osx-darwin.tar.bz2", url)]),
        StubHttp::serving(url, archive),
        Platform::MacOs,
        Arch::X86_64,
    );
    fixture.seed("aria2", "release-1.35.0", Some("aria2c"));
    let descriptor = dependency::find("aria2").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert_eq!(
        outcome.result.unwrap(),
        InstallStatus::Updated {
            from: "release-1.35.0".to_string(),
            to: "release-1.36.0".to_string()
        }
    );
    assert_eq!(
        outcome.trace,
        vec![
            InstallState::Unchecked,
            InstallState::Outdated,
            InstallState::Downloading,
            InstallState::Extracting,
            InstallState::Relocating,
            InstallState::VersionWritten,
        ]
    );

    let bin_dir = fixture.bin_dir("aria2");
    assert_eq!(
        fs::read_to_string(bin_dir.join("aria2c")).unwrap(),
        "aria2c 1.36.0"
    );
    assert_eq!(fixture.marker("aria2").as_deref(), Some("release-1.36.0"));
    assert!(!bin_dir.join("aria2-1.36.0-osx-darwin.tar.bz2").exists());
    assert!(!bin_dir.join("README.html").exists());
    assert!(!leftover_staging(&bin_dir));
}

#[test]
fn test_path_traversal_leaves_marker_untouched() {
    let url = "https://www.bok.net/Bento4/binaries/Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip";
    let archive = zip_bytes(&[
        ("Bento4-SDK/bin/mp4decrypt", b"decrypt"),
        ("../../evil", b"payload"),
    ]);
    let fixture = Fixture::new(
        release("v1.6.0-641", &[]),
        StubHttp::serving(url, archive),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("bento4", "v1.6.0-640", Some("mp4decrypt"));
    let descriptor = dependency::find("bento4").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(matches!(
        outcome.result,
        Err(ToolfetchError::PathTraversal { .. })
    ));
    assert!(matches!(outcome.trace.last(), Some(InstallState::Failed(_))));
    assert!(outcome.trace.contains(&InstallState::Extracting));
    assert!(!outcome.trace.contains(&InstallState::Relocating));

    let bin_dir = fixture.bin_dir("bento4");
    assert_eq!(fixture.marker("bento4").as_deref(), Some("v1.6.0-640"));
    assert_eq!(
        fs::read_to_string(bin_dir.join("mp4decrypt")).unwrap(),
        "old binary"
    );
    assert!(!fixture.root.path().join("evil").exists());
    assert!(!bin_dir.join("evil").exists());
    assert!(!leftover_staging(&bin_dir));
    assert!(
        !bin_dir
            .join("Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip")
            .exists()
    );
}

#[test]
fn test_unreadable_archive_is_downloaded_again() {
    let url = "https://www.bok.net/Bento4/binaries/Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip";
    let fixture = Fixture::new(
        release("v1.6.0-641", &[]),
        StubHttp::serving(url, b"<html>oops</html>".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    let descriptor = dependency::find("bento4").unwrap();
    let bin_dir = fixture.bin_dir("bento4");
    let archive_path = bin_dir.join("Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip");

    let first = install(&fixture.context, &descriptor);

    assert!(matches!(first.result, Err(ToolfetchError::Zip(_))));
    assert_eq!(fixture.gets(), 1);
    assert!(!archive_path.exists());
    assert_eq!(fixture.marker("bento4"), None);

    let http = Arc::new(StubHttp::serving(
        url,
        zip_bytes(&[("SDK/bin/mp4decrypt", b"decrypt")]),
    ));
    let mut retry = fixture.context.clone();
    retry.http_client = http.clone() as Arc<dyn HttpClient>;

    let second = install(&retry, &descriptor);

    assert_eq!(
        second.result.unwrap(),
        InstallStatus::Installed {
            version: "v1.6.0-641".to_string()
        }
    );
    assert_eq!(http.gets(), 1);
    assert_eq!(fs::read_to_string(bin_dir.join("mp4decrypt")).unwrap(), "decrypt");
}

#[test]
fn test_template_archive_install() {
    let url = "https://www.bok.net/Bento4/binaries/Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip";
    let archive = zip_bytes(&[
        ("Bento4-SDK-1-6-0-641.x86_64-unknown-linux/bin/mp4decrypt", b"decrypt"),
        ("Bento4-SDK-1-6-0-641.x86_64-unknown-linux/bin/mp4info", b"info"),
    ]);
    let mut fixture = Fixture::new(
        release("v1.6.0-641", &[]),
        StubHttp::serving(url, archive),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.context.keep_archives = true;
    let descriptor = dependency::find("bento4").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert_eq!(
        outcome.result.unwrap(),
        InstallStatus::Installed {
            version: "v1.6.0-641".to_string()
        }
    );
    let bin_dir = fixture.bin_dir("bento4");
    assert!(file_ops::is_executable(&bin_dir.join("mp4decrypt")).unwrap());
    assert!(!bin_dir.join("mp4info").exists());
    assert!(
        bin_dir
            .join("Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip")
            .exists()
    );
}

#[test]
fn test_kept_archive_is_reused() {
    let url = "https://www.bok.net/Bento4/binaries/Bento4-SDK-1-6-0-641.x86_64-unknown-linux.zip";
    let archive = zip_bytes(&[("SDK/bin/mp4decrypt", b"decrypt")]);
    let fixture = Fixture::new(
        release("v1.6.0-641", &[]),
        StubHttp::default(),
        Platform::Linux,
        Arch::X86_64,
    );
    let bin_dir = fixture.bin_dir("bento4");
    fs::create_dir_all(&bin_dir).unwrap();
    fs::write(
        bin_dir.join(url.rsplit('/').next().unwrap()),
        archive,
    )
    .unwrap();
    let descriptor = dependency::find("bento4").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(outcome.is_success());
    assert_eq!(fixture.gets(), 0);
    assert_eq!(fs::read_to_string(bin_dir.join("mp4decrypt")).unwrap(), "decrypt");
}

#[test]
fn test_archive_without_executable_fails() {
    let url = "https://example.com/ffmpeg-7.0-essentials_build.zip";
    let archive = zip_bytes(&[("ffmpeg-7.0-essentials_build/README.txt", b"readme")]);
    let fixture = Fixture::new(
        release("7.0", &[("ffmpeg-7.0-essentials_build.zip", url)]),
        StubHttp::serving(url, archive),
        Platform::Windows,
        Arch::X86_64,
    );
    let descriptor = dependency::find("ffmpeg").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(matches!(
        outcome.result,
        Err(ToolfetchError::ExecutableNotFound { .. })
    ));
    assert_eq!(fixture.marker("ffmpeg"), None);
    assert!(!leftover_staging(&fixture.bin_dir("ffmpeg")));
    assert!(
        !fixture
            .bin_dir("ffmpeg")
            .join("ffmpeg-7.0-essentials_build.zip")
            .exists()
    );
}

#[test]
fn test_marker_without_executable_reinstalls() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::serving(YT_DLP_URL, b"fresh".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("yt-dlp", "2024.08.06", None);
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert_eq!(
        outcome.result.unwrap(),
        InstallStatus::Installed {
            version: "2024.08.06".to_string()
        }
    );
    assert_eq!(outcome.trace[1], InstallState::Missing);
    assert_eq!(
        fs::read_to_string(fixture.bin_dir("yt-dlp").join("yt-dlp")).unwrap(),
        "fresh"
    );
}

#[test]
fn test_force_reinstalls_current_version() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::serving(YT_DLP_URL, b"fresh".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("yt-dlp", "2024.08.06", Some("yt-dlp"));
    let context = fixture.context.clone().with_force(true);
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&context, &descriptor);

    assert!(matches!(outcome.result, Ok(InstallStatus::Updated { .. })));
    assert_eq!(fixture.gets(), 1);
}

#[test]
fn test_missing_asset_touches_nothing() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp.exe", "https://example.com/yt-dlp.exe")]),
        StubHttp::default(),
        Platform::Linux,
        Arch::X86_64,
    );
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(matches!(
        outcome.result,
        Err(ToolfetchError::AssetNotFound { .. })
    ));
    assert!(!fixture.bin_dir("yt-dlp").exists());
    assert_eq!(fixture.gets(), 0);
}

#[test]
fn test_failed_download_keeps_previous_install() {
    let fixture = Fixture::new(
        release("2024.09.01", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::default(),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.seed("yt-dlp", "2024.08.06", Some("yt-dlp"));
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(matches!(
        outcome.result,
        Err(ToolfetchError::Remote { status: 404, .. })
    ));
    assert_eq!(fixture.marker("yt-dlp").as_deref(), Some("2024.08.06"));
    assert_eq!(
        fs::read_to_string(fixture.bin_dir("yt-dlp").join("yt-dlp")).unwrap(),
        "old binary"
    );
}

#[test]
fn test_short_download_leaves_nothing_until_retry() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::truncated(YT_DLP_URL, b"#!/bin/sh\n".to_vec(), 4096),
        Platform::Linux,
        Arch::X86_64,
    );
    let descriptor = dependency::find("yt-dlp").unwrap();
    let bin_dir = fixture.bin_dir("yt-dlp");

    let first = install(&fixture.context, &descriptor);

    assert!(matches!(
        first.result,
        Err(ToolfetchError::IncompleteWrite {
            expected: 4096,
            actual: 10
        })
    ));
    assert!(matches!(first.trace.last(), Some(InstallState::Failed(_))));
    assert_eq!(fixture.marker("yt-dlp"), None);
    assert!(!bin_dir.join("yt-dlp").exists());
    assert_eq!(fs::read_dir(&bin_dir).unwrap().count(), 0);

    let http = Arc::new(StubHttp::serving(
        YT_DLP_URL,
        b"#!/bin/sh\necho yt-dlp\n".to_vec(),
    ));
    let mut retry = fixture.context.clone();
    retry.http_client = http.clone() as Arc<dyn HttpClient>;

    let second = install(&retry, &descriptor);

    assert_eq!(
        second.result.unwrap(),
        InstallStatus::Installed {
            version: "2024.08.06".to_string()
        }
    );
    assert_eq!(http.gets(), 1);
    assert_eq!(fixture.marker("yt-dlp").as_deref(), Some("2024.08.06"));
    assert!(file_ops::is_executable(&bin_dir.join("yt-dlp")).unwrap());
}

#[test]
fn test_cancelled_before_start() {
    let fixture = Fixture::new(
        release("2024.08.06", &[("yt-dlp_linux", YT_DLP_URL)]),
        StubHttp::serving(YT_DLP_URL, b"x".to_vec()),
        Platform::Linux,
        Arch::X86_64,
    );
    fixture.context.cancel.cancel();
    let descriptor = dependency::find("yt-dlp").unwrap();

    let outcome = install(&fixture.context, &descriptor);

    assert!(matches!(outcome.result, Err(ToolfetchError::Cancelled)));
    assert_eq!(fixture.gets(), 0);
}

#[test]
fn test_status_display() {
    assert_eq!(
        InstallStatus::Updated {
            from: "a".to_string(),
            to: "b".to_string()
        }
        .to_string(),
        "updated a -> b"
    );
    assert_eq!(
        InstallState::Failed("boom".to_string()).to_string(),
        "failed: boom"
    );
}
