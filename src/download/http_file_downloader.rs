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

use crate::download::client::{AttohttpcClient, HttpClient, HttpResponse};
use crate::download::options::DownloadOptions;
use crate::error::{Result, ToolfetchError};
use crate::locking::CancellationToken;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

const DOWNLOAD_CHUNK_SIZE: usize = 8192;
const ERROR_BODY_LIMIT: u64 = 4096;

pub trait ProgressReporter: Send {
    fn on_start(&mut self, total_bytes: u64);

    fn on_progress(&mut self, bytes_downloaded: u64);

    fn on_complete(&mut self);

    fn on_error(&mut self, _message: &str) {}
}

pub struct HttpFileDownloader {
    http_client: Arc<dyn HttpClient>,
    progress_reporter: Option<Box<dyn ProgressReporter>>,
    cancel: CancellationToken,
}

impl Default for HttpFileDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFileDownloader {
    pub fn new() -> Self {
        Self::with_client(Arc::new(AttohttpcClient::new()))
    }

    pub fn with_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            progress_reporter: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Download `url` to `destination`. The body is streamed into a temporary
    /// file beside the destination which is renamed into place only after the
    /// byte count and checksum have been validated.
    pub fn download(
        &mut self,
        url: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> Result<PathBuf> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| ToolfetchError::filesystem(parent, e))?;

        match self.fetch_validated(url, parent, options) {
            Ok(temp_file) => {
                temp_file
                    .persist(destination)
                    .map_err(|e| ToolfetchError::filesystem(destination, e.error))?;
                if let Some(reporter) = &mut self.progress_reporter {
                    reporter.on_complete();
                }
                debug!("Downloaded {url} to {}", destination.display());
                Ok(destination.to_path_buf())
            }
            Err(e) => {
                if let Some(reporter) = &mut self.progress_reporter {
                    reporter.on_error(&e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Returns the validated temporary file. Dropping it on an error path
    /// removes it from disk.
    fn fetch_validated(
        &mut self,
        url: &str,
        dir: &Path,
        options: &DownloadOptions,
    ) -> Result<NamedTempFile> {
        self.cancel.check()?;
        let head_length = self.probe_length(url);

        let response = self.http_client.get(url)?;
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(remote_error(status, response));
        }

        let total_size = head_length
            .or_else(|| content_length(response.as_ref()))
            .or(options.expected_size);

        if let Some(reporter) = &mut self.progress_reporter {
            reporter.on_start(total_size.unwrap_or(0));
        }

        let mut temp_file =
            NamedTempFile::new_in(dir).map_err(|e| ToolfetchError::filesystem(dir, e))?;
        let (written, digest) = self.stream_to_file(response, &mut temp_file)?;

        if let Some(expected) = total_size
            && written != expected
        {
            return Err(ToolfetchError::IncompleteWrite {
                expected,
                actual: written,
            });
        }

        if let Some(expected) = &options.checksum
            && !digest.eq_ignore_ascii_case(expected)
        {
            return Err(ToolfetchError::ChecksumMismatch {
                expected: expected.to_lowercase(),
                actual: digest,
            });
        }

        Ok(temp_file)
    }

    /// Content-Length from a HEAD request. Servers that reject HEAD are not an
    /// error; the GET response is consulted instead.
    fn probe_length(&self, url: &str) -> Option<u64> {
        match self.http_client.head(url) {
            // A zero length on HEAD usually means the server omitted it
            Ok(response) if (200..300).contains(&response.status()) => {
                content_length(response.as_ref()).filter(|len| *len > 0)
            }
            Ok(response) => {
                debug!("HEAD {url} returned {}", response.status());
                None
            }
            Err(e) => {
                debug!("HEAD {url} failed: {e}");
                None
            }
        }
    }

    fn stream_to_file(
        &mut self,
        mut response: Box<dyn HttpResponse>,
        temp_file: &mut NamedTempFile,
    ) -> Result<(u64, String)> {
        let path = temp_file.path().to_path_buf();
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        let mut hasher = Sha256::new();
        let mut downloaded = 0u64;
        let mut buffer = vec![0; DOWNLOAD_CHUNK_SIZE];

        loop {
            self.cancel.check()?;
            match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    writer
                        .write_all(&buffer[..n])
                        .map_err(|e| ToolfetchError::filesystem(&path, e))?;
                    hasher.update(&buffer[..n]);
                    downloaded += n as u64;

                    if let Some(reporter) = &mut self.progress_reporter {
                        reporter.on_progress(downloaded);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ToolfetchError::Transport(e.to_string())),
            }
        }

        writer
            .flush()
            .map_err(|e| ToolfetchError::filesystem(&path, e))?;
        Ok((downloaded, hex::encode(hasher.finalize())))
    }
}

fn content_length(response: &dyn HttpResponse) -> Option<u64> {
    response
        .header("Content-Length")
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn remote_error(status: u16, response: Box<dyn HttpResponse>) -> ToolfetchError {
    let mut body = Vec::new();
    if let Err(e) = response.take(ERROR_BODY_LIMIT).read_to_end(&mut body) {
        warn!("Could not read error body for HTTP {status}: {e}");
    }
    ToolfetchError::Remote {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

#[cfg(test)]
#[path = "http_file_downloader_tests.rs"]
mod http_file_downloader_tests;
