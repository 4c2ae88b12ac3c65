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

//! Inter-process advisory locks and cooperative cancellation.

mod cancellation;
mod lock;

pub use cancellation::{CancellationToken, global_token};
pub use lock::{LockHandle, PollingBackoff, acquire_dependency_lock, lock_path_for};

/// Directory under the install root holding lock files.
pub const LOCKS_DIR: &str = ".locks";
