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
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a ToolfetchError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a ToolfetchError) -> Self {
        let (suggestion, details) = match error {
            ToolfetchError::Transport(msg) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings, then run the update \
                     again."
                        .to_string(),
                );
                (suggestion, Some(msg.clone()))
            }
            ToolfetchError::Remote { status, body } => {
                let suggestion = match status {
                    401 | 403 => Some(
                        "The release API refused the request. Set GITHUB_TOKEN or pass \
                         --github-token to raise the rate limit."
                            .to_string(),
                    ),
                    404 => Some(
                        "The release endpoint was not found. The upstream project may have moved."
                            .to_string(),
                    ),
                    500..=599 => Some("The release server is failing. Try again later.".to_string()),
                    _ => None,
                };
                let details = if body.trim().is_empty() {
                    None
                } else {
                    Some(format!("Response body: {}", truncate(body, 512)))
                };
                (suggestion, details)
            }
            ToolfetchError::Decode(msg) => (
                Some("The upstream response format may have changed.".to_string()),
                Some(msg.clone()),
            ),
            ToolfetchError::AssetNotFound {
                dependency,
                platform,
                arch,
            } => {
                let suggestion = Some(format!(
                    "The latest {dependency} release publishes no build for {platform}/{arch}. \
                     Install it manually and make sure it is on your PATH."
                ));
                (suggestion, None)
            }
            ToolfetchError::PathTraversal { entry } => {
                let suggestion = Some(
                    "Do not use this archive. The release asset may be compromised or the \
                     download corrupted."
                        .to_string(),
                );
                let details = Some(format!(
                    "Entry '{entry}' would have been written outside the extraction directory."
                ));
                (suggestion, details)
            }
            ToolfetchError::Filesystem { path, source } => {
                let suggestion = if source.kind() == std::io::ErrorKind::PermissionDenied {
                    if cfg!(windows) {
                        Some("Run as Administrator or choose another --install-root.".to_string())
                    } else {
                        Some(format!(
                            "Check the permissions of {} or choose another --install-root.",
                            path.display()
                        ))
                    }
                } else {
                    None
                };
                (suggestion, Some(source.to_string()))
            }
            ToolfetchError::IncompleteWrite { .. } => (
                Some("The connection dropped mid-transfer. Run the update again.".to_string()),
                None,
            ),
            ToolfetchError::ChecksumMismatch { expected, actual } => (
                Some(
                    "Try downloading again. If the problem persists, the file may be corrupted \
                     at the source."
                        .to_string(),
                ),
                Some(format!("Expected sha256 {expected}, got {actual}")),
            ),
            ToolfetchError::ExternalDependencyMissing { name, hint } => {
                let suggestion = match hint {
                    Some(url) => Some(format!(
                        "Install {name} using your system package manager: {url}"
                    )),
                    None => Some(format!(
                        "Install {name} using your system package manager."
                    )),
                };
                (suggestion, None)
            }
            ToolfetchError::LockTimeout { .. } => (
                Some(
                    "Another toolfetch process is updating the same install root. Wait for it \
                     to finish."
                        .to_string(),
                ),
                None,
            ),
            ToolfetchError::ConfigError(msg) => (
                Some("Check toolfetch.toml and TOOLFETCH_* environment variables.".to_string()),
                Some(msg.clone()),
            ),
            ToolfetchError::DependenciesFailed(names) => (
                Some(
                    "See the status lines above for the reason each dependency failed."
                        .to_string(),
                ),
                Some(format!("Unusable tools: {}", names.join(", "))),
            ),
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
