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

//! Progress feedback for long-running operations.
//!
//! Indicators render to stderr so that status lines on stdout stay clean.

mod factory;
mod indicatif;
mod silent;
mod simple;
mod types;

pub use factory::ProgressFactory;
pub use indicatif::IndicatifProgress;
pub use silent::SilentProgress;
pub use simple::SimpleProgress;
pub use types::{ProgressConfig, ProgressStyle};

pub trait ProgressIndicator: Send + Sync {
    /// Begin an operation. A config with a total renders a bar, otherwise a
    /// spinner.
    fn start(&mut self, config: ProgressConfig);

    fn update(&mut self, current: u64, total: Option<u64>);

    fn set_message(&mut self, message: String);

    fn complete(&mut self, message: Option<String>);

    /// Finish the operation as failed.
    fn error(&mut self, message: String);
}
