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

use crate::indicator::{IndicatifProgress, ProgressIndicator, SilentProgress, SimpleProgress};
use std::env;
use std::io::IsTerminal;

const FORCE_TTY_ENV: &str = "TOOLFETCH_FORCE_TTY_PROGRESS";

pub struct ProgressFactory;

impl ProgressFactory {
    pub fn create(no_progress: bool) -> Box<dyn ProgressIndicator> {
        if no_progress {
            Box::new(SilentProgress)
        } else if Self::env_flag(FORCE_TTY_ENV) {
            Box::new(IndicatifProgress::new())
        } else if Self::should_use_simple_progress() {
            Box::new(SimpleProgress::new())
        } else {
            Box::new(IndicatifProgress::new())
        }
    }

    /// Parallel updates would interleave animated bars, so they always get
    /// line output.
    pub fn create_for_jobs(no_progress: bool, jobs: usize) -> Box<dyn ProgressIndicator> {
        if !no_progress && jobs > 1 {
            Box::new(SimpleProgress::new())
        } else {
            Self::create(no_progress)
        }
    }

    fn env_flag(name: &str) -> bool {
        env::var(name)
            .map(|value| !matches!(value.trim().to_lowercase().as_str(), "0" | "false"))
            .unwrap_or(false)
    }

    fn should_use_simple_progress() -> bool {
        if !std::io::stderr().is_terminal() {
            return true;
        }

        if env::var("CI").is_ok() || env::var("NO_COLOR").is_ok() {
            return true;
        }

        matches!(env::var("TERM"), Ok(term) if term == "dumb")
    }
}
