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

use crate::indicator::{ProgressConfig, ProgressIndicator, ProgressStyle};
use indicatif::ProgressBar;
use std::time::Duration;

/// Animated terminal indicator backed by `indicatif`.
#[derive(Default)]
pub struct IndicatifProgress {
    progress_bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn template(config: &ProgressConfig) -> &'static str {
        match (config.total, config.style) {
            (Some(_), ProgressStyle::Bytes) => {
                "{spinner:.green} {prefix} [{bar:30.cyan/blue}] \
                 {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}"
            }
            (Some(_), ProgressStyle::Count) => {
                "{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}"
            }
            (None, ProgressStyle::Bytes) => "{spinner:.green} {prefix} {bytes} {msg}",
            (None, ProgressStyle::Count) => "{spinner:.green} {prefix} {msg}",
        }
    }
}

impl ProgressIndicator for IndicatifProgress {
    fn start(&mut self, config: ProgressConfig) {
        let pb = match config.total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };

        let style = indicatif::ProgressStyle::default_bar()
            .template(Self::template(&config))
            .map(|style| style.progress_chars("█▓░").tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"))
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_prefix(format!("{} {}", config.operation, config.context));
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    fn update(&mut self, current: u64, total: Option<u64>) {
        if let Some(pb) = &self.progress_bar {
            if let Some(total) = total {
                pb.set_length(total);
            }
            pb.set_position(current);
        }
    }

    fn set_message(&mut self, message: String) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(message);
        }
    }

    fn complete(&mut self, message: Option<String>) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_with_message(message.unwrap_or_else(|| "Complete".to_string()));
        }
    }

    fn error(&mut self, message: String) {
        if let Some(pb) = self.progress_bar.take() {
            pb.abandon_with_message(format!("✗ {message}"));
        }
    }
}
