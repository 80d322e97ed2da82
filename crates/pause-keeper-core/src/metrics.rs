//! Counters describing what the interceptor has done.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of the interceptor counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorMetrics {
    /// Calls to `send` (logical requests).
    pub requests: u64,

    /// Calls made to the wrapped transport, retries included.
    pub transport_calls: u64,

    /// 429 responses consumed.
    pub rate_limited_responses: u64,

    /// Pause episodes started.
    pub pause_episodes: u64,

    /// Retries sent without pausing (no usable or already-elapsed Retry-After).
    pub immediate_retries: u64,

    /// Logical requests that ended with `Cancelled`.
    pub cancellations: u64,

    /// Logical requests that ended with a transport error.
    pub transport_errors: u64,
}

impl InterceptorMetrics {
    /// Fraction of transport calls answered with 429 (0.0 if none were made).
    pub fn rate_limited_ratio(&self) -> f64 {
        if self.transport_calls == 0 {
            0.0
        } else {
            self.rate_limited_responses as f64 / self.transport_calls as f64
        }
    }
}

/// Lock-free counters shared by every clone of one interceptor.
#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    requests: AtomicU64,
    transport_calls: AtomicU64,
    rate_limited_responses: AtomicU64,
    pause_episodes: AtomicU64,
    immediate_retries: AtomicU64,
    cancellations: AtomicU64,
    transport_errors: AtomicU64,
}

impl MetricsRecorder {
    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transport_call(&self) {
        self.transport_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rate_limited(&self) {
        self.rate_limited_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pause_episode(&self) {
        self.pause_episodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_immediate_retry(&self) {
        self.immediate_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> InterceptorMetrics {
        InterceptorMetrics {
            requests: self.requests.load(Ordering::Relaxed),
            transport_calls: self.transport_calls.load(Ordering::Relaxed),
            rate_limited_responses: self.rate_limited_responses.load(Ordering::Relaxed),
            pause_episodes: self.pause_episodes.load(Ordering::Relaxed),
            immediate_retries: self.immediate_retries.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
