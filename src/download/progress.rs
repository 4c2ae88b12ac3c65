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

use super::ProgressReporter;
use crate::indicator::{ProgressConfig, ProgressFactory, ProgressIndicator, ProgressStyle};

/// Bridges download callbacks to a progress indicator.
pub struct DownloadProgressAdapter {
    indicator: Box<dyn ProgressIndicator>,
    operation: String,
    context: String,
}

impl DownloadProgressAdapter {
    pub fn new(indicator: Box<dyn ProgressIndicator>, operation: &str, context: String) -> Self {
        Self {
            indicator,
            operation: operation.to_string(),
            context,
        }
    }

    /// Progress for one release asset, tagged with its dependency so that
    /// parallel output stays attributable.
    pub fn for_asset(no_progress: bool, jobs: usize, dependency: &str, asset_name: &str) -> Self {
        Self::new(
            ProgressFactory::create_for_jobs(no_progress, jobs),
            "Downloading",
            format!("[{dependency}] {asset_name}"),
        )
    }
}

impl ProgressReporter for DownloadProgressAdapter {
    fn on_start(&mut self, total_bytes: u64) {
        let config = ProgressConfig::new(&self.operation, &self.context, ProgressStyle::Bytes);
        let config = if total_bytes > 0 {
            config.with_total(total_bytes)
        } else {
            config
        };
        self.indicator.start(config);
    }

    fn on_progress(&mut self, bytes_downloaded: u64) {
        self.indicator.update(bytes_downloaded, None);
    }

    fn on_complete(&mut self) {
        self.indicator.complete(Some("Download complete".to_string()));
    }

    fn on_error(&mut self, message: &str) {
        self.indicator.error(message.to_string());
    }
}
