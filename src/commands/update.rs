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

use crate::commands::select_dependencies;
use crate::config::ToolfetchConfig;
use crate::download::AttohttpcClient;
use crate::error::{ErrorContext, Result, ToolfetchError};
use crate::installer::{InstallContext, InstallOutcome};
use crate::locking::global_token;
use crate::release::GithubReleaseSource;
use crate::updater::Updater;
use colored::Colorize;
use log::info;
use std::sync::Arc;

pub struct UpdateCommand<'a> {
    config: &'a ToolfetchConfig,
    no_progress: bool,
}

impl<'a> UpdateCommand<'a> {
    pub fn new(config: &'a ToolfetchConfig, no_progress: bool) -> Result<Self> {
        Ok(Self {
            config,
            no_progress,
        })
    }

    pub fn execute(&self, jobs: Option<usize>, only: &[String], force: bool) -> Result<()> {
        let descriptors = select_dependencies(only)?;
        let jobs = jobs.unwrap_or(self.config.updater.jobs);
        if jobs == 0 {
            return Err(ToolfetchError::ConfigError(
                "--jobs must be at least 1".to_string(),
            ));
        }

        let releases = Arc::new(
            GithubReleaseSource::new(&self.config.github.api_base, self.config.github_token())
                .with_timeout(self.config.api_timeout()),
        );
        let http_client = Arc::new(AttohttpcClient::with_timeout(
            self.config.download_timeout(),
        ));
        let context =
            InstallContext::from_config(self.config, releases, http_client, global_token())?
                .with_force(force)
                .with_progress(self.no_progress)
                .with_jobs(jobs);

        info!(
            "Updating into {} for {}/{}",
            context.install_root.display(),
            context.platform,
            context.arch
        );

        let report = Updater::new(&context).run(&descriptors);
        for outcome in &report.outcomes {
            println!("{}", status_line(outcome));
        }

        if context.cancel.is_cancelled() {
            return Err(ToolfetchError::Cancelled);
        }
        report.into_result().map(|_| ())
    }
}

/// One human-readable line per dependency. Failures are followed by indented
/// details and a suggestion when the error carries them.
pub fn status_line(outcome: &InstallOutcome) -> String {
    match &outcome.result {
        Ok(status) => format!("{} {}: {status}", "✓".green().bold(), outcome.dependency),
        Err(e) => {
            let mut line = format!(
                "{} {}: {}",
                "✗".red().bold(),
                outcome.dependency,
                e.to_string().red()
            );
            let context = ErrorContext::new(e);
            if let Some(details) = &context.details {
                line.push_str(&format!("\n    {details}"));
            }
            if let Some(suggestion) = &context.suggestion {
                line.push_str(&format!("\n    {} {suggestion}", "hint:".yellow()));
            }
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::{InstallState, InstallStatus};

    #[test]
    fn test_status_line_success() {
        let outcome = InstallOutcome {
            dependency: "yt-dlp".to_string(),
            result: Ok(InstallStatus::Installed {
                version: "2024.08.06".to_string(),
            }),
            trace: vec![InstallState::VersionWritten],
        };
        let line = status_line(&outcome);
        assert!(line.contains("✓"));
        assert!(line.contains("yt-dlp"));
        assert!(line.contains("installed 2024.08.06"));
    }

    #[test]
    fn test_status_line_failure() {
        let outcome = InstallOutcome {
            dependency: "bento4".to_string(),
            result: Err(ToolfetchError::InvalidTag("1.6.0".to_string())),
            trace: Vec::new(),
        };
        let line = status_line(&outcome);
        assert!(line.contains("✗"));
        assert!(line.contains("bento4"));
        assert!(line.contains("1.6.0"));
    }

    #[test]
    fn test_status_line_failure_shows_details_and_suggestion() {
        let outcome = InstallOutcome {
            dependency: "yt-dlp".to_string(),
            result: Err(ToolfetchError::Remote {
                status: 403,
                body: r#"{"message":"API rate limit exceeded"}"#.to_string(),
            }),
            trace: Vec::new(),
        };
        let line = status_line(&outcome);
        let lines: Vec<&str> = line.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("HTTP 403"));
        assert!(lines[1].contains("API rate limit exceeded"));
        assert!(lines[2].contains("GITHUB_TOKEN"));
    }

    #[test]
    fn test_status_line_failure_without_context_is_single_line() {
        let outcome = InstallOutcome {
            dependency: "aria2".to_string(),
            result: Err(ToolfetchError::Cancelled),
            trace: Vec::new(),
        };
        assert_eq!(status_line(&outcome).lines().count(), 1);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let config = ToolfetchConfig::default();
        let command = UpdateCommand::new(&config, true).unwrap();
        assert!(matches!(
            command.execute(Some(0), &[], false),
            Err(ToolfetchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected_before_network() {
        let config = ToolfetchConfig::default();
        let command = UpdateCommand::new(&config, true).unwrap();
        assert!(matches!(
            command.execute(None, &["nope".to_string()], false),
            Err(ToolfetchError::ConfigError(_))
        ));
    }
}
