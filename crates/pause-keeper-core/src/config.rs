//! Configuration types for the interceptor.
//!
//! All fields carry serde defaults, so a host application can embed these
//! structs in its own YAML/TOML/JSON configuration and omit any section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Interceptor behaviour settings.
///
/// The defaults honour the server exactly: only absolute HTTP-date
/// `Retry-After` values are used and pauses are never shortened.
///
/// # Examples
///
/// ```
/// use pause_keeper_core::InterceptorConfig;
/// use std::time::Duration;
///
/// let config = InterceptorConfig::default()
///     .with_accept_delta_seconds(true)
///     .with_max_pause(Duration::from_secs(300));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_pause(), Some(Duration::from_secs(300)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// Also honour `Retry-After: <seconds>` values
    pub accept_delta_seconds: bool,

    /// Upper bound for a single pause episode (seconds, `None` = no bound)
    pub max_pause_seconds: Option<u64>,
}

impl InterceptorConfig {
    /// Enable or disable the delta-seconds `Retry-After` form.
    pub fn with_accept_delta_seconds(mut self, accept: bool) -> Self {
        self.accept_delta_seconds = accept;
        self
    }

    /// Cap every pause episode at `max_pause` (rounded up to whole seconds).
    pub fn with_max_pause(mut self, max_pause: Duration) -> Self {
        let seconds = max_pause
            .as_secs()
            .saturating_add(u64::from(max_pause.subsec_nanos() > 0));
        self.max_pause_seconds = Some(seconds);
        self
    }

    /// Remove the pause cap.
    pub fn without_max_pause(mut self) -> Self {
        self.max_pause_seconds = None;
        self
    }

    /// The pause cap as a duration.
    pub fn max_pause(&self) -> Option<Duration> {
        self.max_pause_seconds.map(Duration::from_secs)
    }

    /// Check the configuration for values the interceptor cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `max_pause_seconds` is zero, which
    /// would turn every rate-limited response into an immediate retry loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pause_seconds == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_pause_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level used when `RUST_LOG` is not set
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
