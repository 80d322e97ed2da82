//! `Retry-After` handling.
//!
//! Servers send either an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`) or a
//! number of seconds. The interceptor works with absolute instants, so both
//! forms are normalised to a `DateTime<Utc>` and turned into a delay relative
//! to the current wall clock only at the moment a pause is decided.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::{debug, warn};

use crate::config::InterceptorConfig;

/// Extracts the retry instant from response headers.
///
/// # Examples
///
/// ```
/// use pause_keeper_core::RetryAfterParser;
/// use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
///
/// let parser = RetryAfterParser::default();
/// let retry_at = parser.retry_at(&headers).unwrap();
/// assert_eq!(retry_at.timestamp(), 1_445_412_480);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryAfterParser {
    accept_delta_seconds: bool,
}

impl RetryAfterParser {
    /// Create a parser.
    ///
    /// # Arguments
    ///
    /// * `accept_delta_seconds` - Also accept the `Retry-After: <seconds>` form
    pub fn new(accept_delta_seconds: bool) -> Self {
        Self {
            accept_delta_seconds,
        }
    }

    /// Create a parser matching the interceptor configuration.
    pub fn from_config(config: &InterceptorConfig) -> Self {
        Self::new(config.accept_delta_seconds)
    }

    /// Whether the delta-seconds form is honoured.
    pub fn accepts_delta_seconds(&self) -> bool {
        self.accept_delta_seconds
    }

    /// Read the retry instant from `headers` using the current time for
    /// delta-seconds values.
    ///
    /// # Returns
    ///
    /// `None` if the header is absent or cannot be parsed.
    pub fn retry_at(&self, headers: &HeaderMap) -> Option<DateTime<Utc>> {
        self.retry_at_from(headers, Utc::now())
    }

    /// Read the retry instant from `headers`, resolving delta-seconds values
    /// against `now`.
    pub fn retry_at_from(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let raw_value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
        self.parse_value(raw_value, now)
    }

    /// Parse a raw header value.
    pub fn parse_value(&self, raw_value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Ok(date) = httpdate::parse_http_date(raw_value) {
            return Some(system_time_to_utc(date));
        }

        if self.accept_delta_seconds {
            if let Ok(seconds) = raw_value.parse::<u32>() {
                return Some(now + chrono::Duration::seconds(i64::from(seconds)));
            }
        }

        debug!(header_value = raw_value, "Ignoring unparseable Retry-After header");
        None
    }
}

/// Compute how long to pause for a retry instant.
///
/// The delay only moves forward: instants at or before `now`, and a missing
/// instant, produce `Duration::ZERO`. When `max_pause` is set, longer delays
/// are capped to it.
///
/// # Examples
///
/// ```
/// use chrono::{Duration as ChronoDuration, Utc};
/// use pause_keeper_core::pause_delay;
/// use std::time::Duration;
///
/// let now = Utc::now();
/// assert_eq!(pause_delay(None, now, None), Duration::ZERO);
/// assert_eq!(
///     pause_delay(Some(now - ChronoDuration::seconds(5)), now, None),
///     Duration::ZERO
/// );
/// assert_eq!(
///     pause_delay(Some(now + ChronoDuration::milliseconds(250)), now, None),
///     Duration::from_millis(250)
/// );
/// ```
pub fn pause_delay(
    retry_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_pause: Option<Duration>,
) -> Duration {
    let Some(retry_at) = retry_at else {
        return Duration::ZERO;
    };

    // `to_std` fails for negative spans, i.e. an instant already in the past.
    let delay = (retry_at - now).to_std().unwrap_or(Duration::ZERO);

    match max_pause {
        Some(cap) if delay > cap => {
            warn!(
                requested_ms = millis(delay),
                capped_ms = millis(cap),
                retry_at = %retry_at,
                "Retry-After exceeds configured maximum pause; capping"
            );
            cap
        }
        _ => delay,
    }
}

/// Whole milliseconds of `duration` for log fields, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
#[path = "retry_after_tests.rs"]
mod tests;
