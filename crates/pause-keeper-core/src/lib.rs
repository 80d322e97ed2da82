//! # Pause-Keeper Core
//!
//! HTTP request interceptor that absorbs server-side rate limiting.
//!
//! When any request answered through a [`RetryInterceptor`] receives a
//! 429 Too Many Requests, every request sharing that interceptor is held
//! until the server's `Retry-After` instant, and the rate-limited request is
//! sent again. Callers only ever see a non-429 response, a transport error,
//! or cancellation.
//!
//! ## Architecture
//!
//! - [`PauseGate`]: broadcast pause flag every request waits on
//! - [`RetryInterceptor`]: send loop, coordination lock and pause episodes
//! - [`Transport`]: the wrapped HTTP client, with [`ReqwestTransport`] built in
//! - [`BlockingRetryInterceptor`]: synchronous front end sharing the same gate
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pause_keeper_core::{ReqwestTransport, RetryInterceptor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//! let interceptor = RetryInterceptor::new(ReqwestTransport::new(client.clone()));
//!
//! // Clones share the pause state: a 429 seen by one task pauses them all.
//! let worker = interceptor.clone();
//! let request = client.get("https://api.example.com/items").build()?;
//! let response = worker.send(&request, &CancellationToken::new()).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod metrics;
pub mod pause_gate;
pub mod retry_after;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use blocking::BlockingRetryInterceptor;
pub use config::{InterceptorConfig, LoggingConfig};
pub use error::{BlockingError, Cancelled, ConfigError, InterceptorError, ReqwestTransportError};
pub use interceptor::RetryInterceptor;
pub use metrics::InterceptorMetrics;
pub use pause_gate::{PauseGate, PauseGuard};
pub use retry_after::{pause_delay, RetryAfterParser};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
