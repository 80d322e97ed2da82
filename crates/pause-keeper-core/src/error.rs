//! Error types for rate-limit aware request sending.
//!
//! A 429 response is never represented here: it is consumed by the
//! interceptor as a control-flow signal. What remains is cancellation,
//! failures of the wrapped transport, and configuration problems.

use thiserror::Error;

/// The caller's cancellation token fired while the request was suspended.
///
/// Returned by [`PauseGate::wait_while_paused`](crate::PauseGate::wait_while_paused)
/// and surfaced by the interceptor as [`InterceptorError::Cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// Errors returned by [`RetryInterceptor::send`](crate::RetryInterceptor::send).
///
/// # Type Parameters
///
/// - `E`: Error type of the wrapped transport
#[derive(Debug, Error)]
pub enum InterceptorError<E> {
    /// Cancellation fired during a pause wait, the coordination lock wait,
    /// the Retry-After delay, or a transport call.
    #[error("Request cancelled")]
    Cancelled,

    /// The wrapped transport failed. Passed through unchanged and never retried.
    #[error("Transport error: {0}")]
    Transport(#[source] E),
}

impl<E> InterceptorError<E> {
    /// Check if the request ended because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get the underlying transport error, if this is one.
    pub fn transport_error(&self) -> Option<&E> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Cancelled => None,
        }
    }

    /// Consume the error and return the transport error, if this is one.
    pub fn into_transport_error(self) -> Option<E> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

impl<E> From<Cancelled> for InterceptorError<E> {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Invalid interceptor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures of the built-in reqwest transport.
#[derive(Debug, Error)]
pub enum ReqwestTransportError {
    /// The request body is a stream and cannot be sent a second time.
    #[error("Request cannot be replayed (streaming body)")]
    NonReplayableRequest,

    /// The cancellation token fired while the request was in flight.
    #[error("Request cancelled while in flight")]
    Cancelled,

    /// HTTP client error (network, TLS, timeout, etc.).
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReqwestTransportError {
    /// Check if this error represents a transient condition.
    ///
    /// Only network-level failures are transient; the interceptor itself never
    /// retries them, this is for callers layering their own policy on top.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NonReplayableRequest => false,
            Self::Cancelled => false,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

/// Failures while setting up the blocking wrapper.
#[derive(Debug, Error)]
pub enum BlockingError {
    /// The private tokio runtime could not be created.
    #[error("Failed to build blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
