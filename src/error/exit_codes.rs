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

use crate::error::ToolfetchError;

pub fn get_exit_code(error: &ToolfetchError) -> i32 {
    match error {
        ToolfetchError::ConfigError(_) | ToolfetchError::InvalidTag(_) => 2,

        ToolfetchError::DependenciesFailed(_) => 3,

        ToolfetchError::AssetNotFound { .. } | ToolfetchError::UnsupportedPlatform(_) => 4,

        ToolfetchError::PathTraversal { .. } => 13,

        ToolfetchError::Transport(_) | ToolfetchError::Remote { .. } => 20,

        ToolfetchError::LockTimeout { .. } => 75,

        ToolfetchError::ExternalDependencyMissing { .. } => 127,

        ToolfetchError::Cancelled => 130,

        _ => 1,
    }
}
