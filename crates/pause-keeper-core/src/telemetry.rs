//! Logging setup for binaries and test harnesses embedding the interceptor.
//!
//! The library itself only emits `tracing` events; nothing is printed unless
//! the host installs a subscriber, either its own or the one built here.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. An unparseable level
/// falls back to `info`.
///
/// # Returns
///
/// `true` if the subscriber was installed, `false` if one was already set.
///
/// # Examples
///
/// ```
/// use pause_keeper_core::{telemetry, LoggingConfig};
///
/// let installed = telemetry::init_logging(&LoggingConfig::default());
/// let installed_again = telemetry::init_logging(&LoggingConfig::default());
/// assert!(!installed_again || !installed);
/// ```
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_format {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    result.is_ok()
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
