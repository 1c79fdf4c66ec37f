//! Assertion configuration
//!
//! Timing knobs shared by every check: how long `should_wait` checks wait,
//! and how often the poller re-evaluates.

use crate::result::{AssertError, AssertResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait for `should_wait` checks (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Environment variable overriding the wait timeout, in whole seconds
pub const ENV_WAIT_TIMEOUT_SECS: &str = "PROBAR_ASSERT_WAIT_TIMEOUT_SECS";

/// Environment variable overriding the poll interval, in milliseconds
pub const ENV_POLL_INTERVAL_MS: &str = "PROBAR_ASSERT_POLL_INTERVAL_MS";

/// Timing configuration for assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertConfig {
    /// How long `should_wait` checks poll before deciding
    pub wait_timeout: Duration,
    /// Interval between polling attempts
    pub poll_interval: Duration,
}

impl Default for AssertConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl AssertConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wait timeout
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create a fast config (short wait, fast polling)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            wait_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Parse a JSON document; missing fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the document is not valid
    pub fn from_json_str(json: &str) -> AssertResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AssertError::invalid_argument("config", e.to_string()))
    }

    /// Read overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a variable is set but not a number
    pub fn from_env() -> AssertResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a value is set but not a number
    pub fn from_lookup<F>(lookup: F) -> AssertResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(secs) = parse_var(&lookup, ENV_WAIT_TIMEOUT_SECS)? {
            config.wait_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var(&lookup, ENV_POLL_INTERVAL_MS)? {
            config.poll_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> AssertResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                AssertError::invalid_argument(key, format!("expected a whole number, got '{raw}'"))
            }),
    }
}

/// Convert a whole-second timeout from the public API
#[must_use]
pub const fn seconds(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs)
}
