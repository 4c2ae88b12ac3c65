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

pub mod list;
pub mod update;

use crate::dependency::{self, DependencyDescriptor};
use crate::error::{Result, ToolfetchError};

/// Catalog entries named by `--only`, in catalog order. An empty selection
/// means every dependency.
pub fn select_dependencies(only: &[String]) -> Result<Vec<DependencyDescriptor>> {
    if let Some(unknown) = only.iter().find(|name| dependency::find(name).is_none()) {
        let known: Vec<&str> = dependency::catalog().iter().map(|d| d.name).collect();
        return Err(ToolfetchError::ConfigError(format!(
            "unknown dependency '{unknown}' (known: {})",
            known.join(", ")
        )));
    }

    Ok(dependency::catalog()
        .into_iter()
        .filter(|d| only.is_empty() || only.iter().any(|name| name == d.name))
        .collect())
}
