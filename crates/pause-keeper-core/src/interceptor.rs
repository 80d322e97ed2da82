//! Rate-limit aware request sending.
//!
//! [`RetryInterceptor`] sits in front of a [`Transport`]. A 429 response
//! pauses every request going through the same interceptor until the
//! server's `Retry-After` instant, then the rate-limited request is sent
//! again. Callers never see the 429.
//!
//! # Request lifecycle
//!
//! ```text
//! SENDING --(non-429)------------------> DONE
//! SENDING --(429, nothing to wait)-----> SENDING
//! SENDING --(429, retry instant ahead)-> PAUSING -> SENDING
//! ```
//!
//! Only one request at a time decides on a pause (the coordination lock).
//! Because the retry instant is absolute, requests that queued up on the lock
//! behind a pause holder find it already elapsed and retry without pausing
//! again.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::InterceptorConfig;
use crate::error::{Cancelled, InterceptorError};
use crate::metrics::{InterceptorMetrics, MetricsRecorder};
use crate::pause_gate::PauseGate;
use crate::retry_after::{millis, pause_delay, RetryAfterParser};
use crate::transport::{Transport, TransportResponse};

/// Wraps a transport and absorbs 429 responses.
///
/// Cloning is cheap; clones share the transport, the pause gate, the
/// coordination lock and the metrics.
///
/// # Examples
///
/// ```no_run
/// use pause_keeper_core::{InterceptorConfig, ReqwestTransport, RetryInterceptor};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = reqwest::Client::new();
/// let interceptor = RetryInterceptor::with_config(
///     ReqwestTransport::new(client.clone()),
///     InterceptorConfig::default().with_accept_delta_seconds(true),
/// )?;
///
/// let request = client.get("https://api.example.com/items").build()?;
/// let response = interceptor.send(&request, &CancellationToken::new()).await?;
/// assert_ne!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
/// # Ok(())
/// # }
/// ```
pub struct RetryInterceptor<T> {
    transport: Arc<T>,
    gate: PauseGate,
    coordination: Arc<Mutex<()>>,
    parser: RetryAfterParser,
    max_pause: Option<Duration>,
    metrics: Arc<MetricsRecorder>,
}

impl<T> Clone for RetryInterceptor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            gate: self.gate.clone(),
            coordination: Arc::clone(&self.coordination),
            parser: self.parser,
            max_pause: self.max_pause,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T> std::fmt::Debug for RetryInterceptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryInterceptor")
            .field("paused", &self.gate.is_paused())
            .field("parser", &self.parser)
            .field("max_pause", &self.max_pause)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RetryInterceptor<T> {
    /// Wrap `transport` with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::build(transport, &InterceptorConfig::default())
    }

    /// Wrap `transport` with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn with_config(
        transport: T,
        config: InterceptorConfig,
    ) -> Result<Self, crate::error::ConfigError> {
        config.validate()?;
        Ok(Self::build(transport, &config))
    }

    fn build(transport: T, config: &InterceptorConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            gate: PauseGate::new(),
            coordination: Arc::new(Mutex::new(())),
            parser: RetryAfterParser::from_config(config),
            max_pause: config.max_pause(),
            metrics: Arc::new(MetricsRecorder::default()),
        }
    }

    /// Get the wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the pause gate shared by all requests of this interceptor.
    pub fn pause_gate(&self) -> &PauseGate {
        &self.gate
    }

    /// Check whether a pause episode is in progress.
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Get a snapshot of the interceptor counters.
    pub fn metrics(&self) -> InterceptorMetrics {
        self.metrics.snapshot()
    }

    /// Send `request`, retrying for as long as the server answers 429.
    ///
    /// Waits while another request's pause is active, then delegates to the
    /// transport. Any response other than 429 is returned unchanged. A 429
    /// triggers a pause until its `Retry-After` instant (or an immediate retry
    /// when there is nothing to wait for) and the request is sent again.
    /// There is no attempt limit.
    ///
    /// # Errors
    ///
    /// - `InterceptorError::Cancelled` if `cancel` fires during a pause wait,
    ///   the coordination lock wait, the Retry-After delay, or while the
    ///   transport is in flight
    /// - `InterceptorError::Transport` for any transport failure, unchanged
    pub async fn send(
        &self,
        request: &T::Request,
        cancel: &CancellationToken,
    ) -> Result<T::Response, InterceptorError<T::Error>> {
        self.metrics.record_request();

        let result = self.send_until_accepted(request, cancel).await;
        match &result {
            Ok(_) => {}
            Err(InterceptorError::Cancelled) => self.metrics.record_cancellation(),
            Err(InterceptorError::Transport(_)) => self.metrics.record_transport_error(),
        }
        result
    }

    async fn send_until_accepted(
        &self,
        request: &T::Request,
        cancel: &CancellationToken,
    ) -> Result<T::Response, InterceptorError<T::Error>> {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;

            self.gate.wait_while_paused(cancel).await?;

            self.metrics.record_transport_call();
            let response = match self.transport.send(request, cancel).await {
                Ok(response) => response,
                // Whatever the transport reports once the token has fired, the
                // caller asked to stop.
                Err(error) if cancel.is_cancelled() => {
                    debug!(attempt, error = %error, "Transport failed after cancellation");
                    return Err(InterceptorError::Cancelled);
                }
                Err(error) => return Err(InterceptorError::Transport(error)),
            };

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                debug!(attempt, status = %response.status(), "Response passed through");
                return Ok(response);
            }

            self.metrics.record_rate_limited();

            let coordination = self.acquire_coordination(cancel).await?;

            let retry_at = response.retry_at(&self.parser);
            drop(response);

            let delay = pause_delay(retry_at, Utc::now(), self.max_pause);
            if delay.is_zero() {
                self.metrics.record_immediate_retry();
                debug!(
                    attempt,
                    retry_at = ?retry_at,
                    "Rate limited with no pending Retry-After; retrying immediately"
                );
                drop(coordination);
                continue;
            }

            self.pause_all(delay, attempt, cancel).await?;
            drop(coordination);
        }
    }

    async fn acquire_coordination(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MutexGuard<'_, ()>, Cancelled> {
        tokio::select! {
            guard = self.coordination.lock() => Ok(guard),
            _ = cancel.cancelled() => Err(Cancelled),
        }
    }

    /// Hold every request of this interceptor for `delay`.
    ///
    /// The gate is reopened when this returns, whether the delay elapsed, the
    /// token fired, or the calling future was dropped.
    async fn pause_all(
        &self,
        delay: Duration,
        attempt: u64,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let _pause = self.gate.begin_pause();
        self.metrics.record_pause_episode();

        let delay_ms = millis(delay);
        info!(attempt, delay_ms, "Rate limited; pausing outgoing requests");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                info!(delay_ms, "Pause elapsed; resuming outgoing requests");
                Ok(())
            }
            _ = cancel.cancelled() => {
                warn!(delay_ms, "Pause holder cancelled; resuming outgoing requests early");
                Err(Cancelled)
            }
        }
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod tests;
