//! Scripted in-memory transport shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::retry_after::RetryAfterParser;
use crate::transport::{Transport, TransportResponse};

/// Response produced by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Exact retry instant, bypassing the one-second resolution of HTTP dates.
    pub retry_at: Option<DateTime<Utc>>,
    pub body: String,
}

impl TransportResponse for TestResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn retry_at(&self, parser: &RetryAfterParser) -> Option<DateTime<Utc>> {
        self.retry_at.or_else(|| parser.retry_at(&self.headers))
    }
}

#[derive(Debug, Error)]
#[error("scripted transport failure: {0}")]
pub(crate) struct TestTransportError(pub String);

/// One scripted outcome.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Plain response with this status.
    Status(StatusCode),
    /// 429 carrying a fixed retry instant (or none).
    RateLimitedUntil(Option<DateTime<Utc>>),
    /// 429 whose retry instant is `delay` after the moment it is sent.
    RateLimitedFor(Duration),
    /// 429 with raw headers and no out-of-band instant.
    RateLimitedWithHeaders(HeaderMap),
    /// Transport failure.
    Fail(String),
}

/// Record of one transport call.
#[derive(Debug, Clone)]
pub(crate) struct CallRecord {
    pub request: String,
    pub at: Instant,
}

/// Transport that replays a script, then answers 200 forever.
#[derive(Debug)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<CallRecord>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn response(status: StatusCode, request: &str) -> TestResponse {
        TestResponse {
            status,
            headers: HeaderMap::new(),
            retry_at: None,
            body: request.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Request = String;
    type Response = TestResponse;
    type Error = TestTransportError;

    async fn send(
        &self,
        request: &String,
        _cancel: &CancellationToken,
    ) -> Result<TestResponse, TestTransportError> {
        self.calls.lock().unwrap().push(CallRecord {
            request: request.clone(),
            at: Instant::now(),
        });

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Status(StatusCode::OK));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Reply::Status(status) => Ok(Self::response(status, request)),
            Reply::RateLimitedUntil(retry_at) => Ok(TestResponse {
                retry_at,
                ..Self::response(StatusCode::TOO_MANY_REQUESTS, request)
            }),
            Reply::RateLimitedFor(delay) => Ok(TestResponse {
                retry_at: Some(Utc::now() + chrono::Duration::from_std(delay).unwrap()),
                ..Self::response(StatusCode::TOO_MANY_REQUESTS, request)
            }),
            Reply::RateLimitedWithHeaders(headers) => Ok(TestResponse {
                headers,
                ..Self::response(StatusCode::TOO_MANY_REQUESTS, request)
            }),
            Reply::Fail(message) => Err(TestTransportError(message)),
        }
    }
}
