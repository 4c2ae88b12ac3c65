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

use crate::config::ToolfetchConfig;
use crate::dependency::{self, DependencyDescriptor};
use crate::error::{Result, ToolfetchError};
use crate::platform::{self, Platform};
use crate::version::VersionStore;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handling {
    /// Downloaded and updated by toolfetch
    Managed,
    /// Provided by the system package manager
    System,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyEntry {
    pub name: String,
    pub display_name: String,
    pub handling: Handling,
    pub version: Option<String>,
    pub executable: Option<PathBuf>,
}

pub struct ListCommand<'a> {
    config: &'a ToolfetchConfig,
}

impl<'a> ListCommand<'a> {
    pub fn new(config: &'a ToolfetchConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, json: bool) -> Result<()> {
        let platform = platform::current_platform()?;
        let entries = collect_entries(&self.config.install_root, platform)?;

        if json {
            let output = serde_json::to_string_pretty(&entries)
                .map_err(|e| ToolfetchError::Decode(e.to_string()))?;
            println!("{output}");
            return Ok(());
        }

        println!("{}", render_table(&entries));
        if entries.iter().any(|e| e.executable.is_none()) {
            println!(
                "{} run 'toolfetch update' to install missing tools",
                "hint:".yellow().bold()
            );
        }
        Ok(())
    }
}

/// Installed state of every catalog dependency. Reads the disk only.
pub fn collect_entries(install_root: &Path, platform: Platform) -> Result<Vec<DependencyEntry>> {
    dependency::catalog()
        .iter()
        .map(|descriptor| entry_for(descriptor, install_root, platform))
        .collect()
}

fn entry_for(
    descriptor: &DependencyDescriptor,
    install_root: &Path,
    platform: Platform,
) -> Result<DependencyEntry> {
    let (handling, version, executable) = if descriptor.is_external_on(platform) {
        let found = which::which(descriptor.primary_executable).ok();
        debug!("{}: system lookup -> {found:?}", descriptor.name);
        (Handling::System, None, found)
    } else {
        let version = VersionStore::for_dependency(install_root, descriptor).read_optional()?;
        (
            Handling::Managed,
            version,
            descriptor.installed_executable(install_root),
        )
    };

    Ok(DependencyEntry {
        name: descriptor.name.to_string(),
        display_name: descriptor.display_name.to_string(),
        handling,
        version,
        executable,
    })
}

pub fn render_table(entries: &[DependencyEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
    table.set_header(vec![
        Cell::new("Dependency"),
        Cell::new("Handling"),
        Cell::new("Version"),
        Cell::new("Executable"),
    ]);

    for entry in entries {
        let handling = match entry.handling {
            Handling::Managed => "managed",
            Handling::System => "system",
        };
        let version = entry
            .version
            .as_deref()
            .map(str::trim)
            .unwrap_or("-")
            .to_string();
        let executable = match &entry.executable {
            Some(path) => Cell::new(path.display().to_string()).fg(Color::Green),
            None => Cell::new("missing").fg(Color::Red),
        };

        table.add_row(vec![
            Cell::new(&entry.display_name),
            Cell::new(handling),
            Cell::new(version),
            executable,
        ]);
    }

    table
}
