//! Engine configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Remote used for inbound analysis when nothing else is configured.
pub const DEFAULT_REMOTE: &str = "origin";

/// Default timeout for `git fetch` (2 minutes).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the remote name.
pub const REMOTE_ENV_VAR: &str = "SHEAF_REMOTE";

/// Environment variable overriding the fetch timeout, in seconds.
pub const FETCH_TIMEOUT_ENV_VAR: &str = "SHEAF_FETCH_TIMEOUT";

/// Runtime settings shared by the provider and the analyzers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub remote: String,
    pub fetch_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Build a config from `SHEAF_REMOTE` and `SHEAF_FETCH_TIMEOUT`.
    ///
    /// Unset or empty variables fall back to the defaults. An unparsable
    /// timeout logs a warning and also falls back.
    pub fn from_env() -> Self {
        let remote = match env::var(REMOTE_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => DEFAULT_REMOTE.to_string(),
        };

        Self {
            remote,
            fetch_timeout: fetch_timeout_from_env(),
        }
    }

    /// Replace the remote when a non-empty override is given.
    pub fn with_remote(mut self, remote: Option<&str>) -> Self {
        if let Some(r) = remote.map(str::trim).filter(|r| !r.is_empty()) {
            self.remote = r.to_string();
        }
        self
    }
}

fn fetch_timeout_from_env() -> Duration {
    match env::var(FETCH_TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    FETCH_TIMEOUT_ENV_VAR, v, DEFAULT_FETCH_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
    }
}
