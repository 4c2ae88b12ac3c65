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

use crate::error::{Result, ToolfetchError};
use log::warn;
use signal_hook::SigId;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(windows)]
use signal_hook::consts::signal::SIGBREAK;

/// Shared flag raised by Ctrl-C or SIGTERM and polled by long-running work.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// `Err(Cancelled)` once the token has been raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ToolfetchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

struct SignalRegistry {
    flag: Arc<AtomicBool>,
    _handles: Vec<SigId>,
}

impl SignalRegistry {
    fn install() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let handles = handled_signals()
            .iter()
            .filter_map(|signal| match flag::register(*signal, flag.clone()) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    warn!("Cannot watch signal {signal} for cancellation: {err}");
                    None
                }
            })
            .collect();

        Self {
            flag,
            _handles: handles,
        }
    }
}

fn handled_signals() -> &'static [i32] {
    #[cfg(windows)]
    {
        static SIGNALS: [i32; 3] = [SIGINT, SIGTERM, SIGBREAK];
        &SIGNALS
    }

    #[cfg(not(windows))]
    {
        static SIGNALS: [i32; 2] = [SIGINT, SIGTERM];
        &SIGNALS
    }
}

static REGISTRY: OnceLock<SignalRegistry> = OnceLock::new();

/// Token raised by process signals. Handlers are installed on first use.
pub fn global_token() -> CancellationToken {
    let registry = REGISTRY.get_or_init(SignalRegistry::install);
    CancellationToken {
        flag: registry.flag.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(ToolfetchError::Cancelled)));
    }

    #[test]
    fn test_global_token_is_shared() {
        let a = global_token();
        let b = global_token();
        assert!(Arc::ptr_eq(&a.flag, &b.flag));
    }
}
