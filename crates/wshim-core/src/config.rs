#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Defaults suit a page that loads the module alongside its options panel.
//! Native embedders can override them through environment variables:
//!
//! | Variable                 | Field                     | Default   |
//! |--------------------------|---------------------------|-----------|
//! | `WSHIM_POLL_INTERVAL_MS` | `retry.poll_interval_ms`  | `10`      |
//! | `WSHIM_READY_TIMEOUT_MS` | `retry.timeout_ms`        | `2000`    |
//! | `WSHIM_PANEL_ID`         | `panel_id`                | `options` |
//!
//! Unparsable values keep the default and are reported as [`ConfigError`]s.

use std::env;
use std::fmt;

pub const ENV_POLL_INTERVAL_MS: &str = "WSHIM_POLL_INTERVAL_MS";
pub const ENV_READY_TIMEOUT_MS: &str = "WSHIM_READY_TIMEOUT_MS";
pub const ENV_PANEL_ID: &str = "WSHIM_PANEL_ID";

/// Fixed-interval, bounded wait used for both host and panel readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between probes (ms).
    pub poll_interval_ms: u64,
    /// Overall bound per waiting state (ms).
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            timeout_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Upper bound on probes per waiting state, counting the first one.
    #[must_use]
    pub fn max_attempts(&self) -> u64 {
        let interval = self.poll_interval_ms.max(1);
        self.timeout_ms / interval + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub retry: RetryPolicy,
    /// Element id of the options panel inside the host document.
    pub panel_id: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            panel_id: "options".to_owned(),
        }
    }
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Parsed configuration plus the overrides that were rejected.
#[derive(Debug, Clone)]
pub struct RuntimeConfigParse {
    pub config: RuntimeConfig,
    pub errors: Vec<ConfigError>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> RuntimeConfig {
        Self::from_env_with_diagnostics().config
    }

    #[must_use]
    pub fn from_env_with_diagnostics() -> RuntimeConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.retry.poll_interval_ms == 0 {
            errors.push(ConfigError::new(
                "poll_interval_ms",
                "0",
                "poll interval must be positive",
            ));
        }
        if self.panel_id.trim().is_empty() {
            errors.push(ConfigError::new(
                "panel_id",
                self.panel_id.clone(),
                "panel id must not be empty",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Build a config from an arbitrary key lookup.
pub fn from_env_with<F>(mut get: F) -> RuntimeConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = RuntimeConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_POLL_INTERVAL_MS) {
        match parse_positive_ms(&value) {
            Some(parsed) => config.retry.poll_interval_ms = parsed,
            None => errors.push(ConfigError::new(
                "poll_interval_ms",
                value,
                "expected positive integer milliseconds",
            )),
        }
    }

    if let Some(value) = get(ENV_READY_TIMEOUT_MS) {
        match value.trim().parse::<u64>() {
            Ok(parsed) => config.retry.timeout_ms = parsed,
            Err(_) => errors.push(ConfigError::new(
                "timeout_ms",
                value,
                "expected integer milliseconds",
            )),
        }
    }

    if let Some(value) = get(ENV_PANEL_ID) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.push(ConfigError::new("panel_id", value, "expected a non-empty id"));
        } else {
            config.panel_id = trimmed.to_owned();
        }
    }

    RuntimeConfigParse { config, errors }
}

fn parse_positive_ms(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}
