//! Transport abstraction wrapped by the interceptor.
//!
//! The interceptor knows nothing about connections, TLS or bodies. It needs a
//! way to send a request (possibly several times) and, for each response, its
//! status code and the server's retry instant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::error::ReqwestTransportError;
use crate::retry_after::RetryAfterParser;

/// Response inspected by the interceptor.
pub trait TransportResponse {
    /// HTTP status of the response.
    fn status(&self) -> StatusCode;

    /// Response headers.
    fn headers(&self) -> &HeaderMap;

    /// Absolute instant at which the server allows a retry.
    ///
    /// The default reads the `Retry-After` header. Transports that carry the
    /// instant out of band can override this.
    fn retry_at(&self, parser: &RetryAfterParser) -> Option<DateTime<Utc>> {
        parser.retry_at(self.headers())
    }
}

/// Sends requests on behalf of the interceptor.
///
/// The same request may be sent any number of times, so `send` borrows it.
/// Implementations must be safe for concurrent use: the interceptor calls
/// `send` from every task that shares it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Request type accepted by the transport.
    type Request: Send + Sync;

    /// Response type produced by the transport.
    type Response: TransportResponse + Send;

    /// Failure type of the transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` once.
    ///
    /// # Arguments
    ///
    /// * `request` - Request to send; left intact for later retries
    /// * `cancel` - Token of the logical request this send belongs to
    async fn send(
        &self,
        request: &Self::Request,
        cancel: &CancellationToken,
    ) -> Result<Self::Response, Self::Error>;
}

impl TransportResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }
}

/// Transport over a `reqwest::Client`.
///
/// # Examples
///
/// ```no_run
/// use pause_keeper_core::{ReqwestTransport, RetryInterceptor};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = reqwest::Client::new();
/// let interceptor = RetryInterceptor::new(ReqwestTransport::new(client.clone()));
///
/// let request = client.get("https://api.example.com/items").build()?;
/// let response = interceptor.send(&request, &CancellationToken::new()).await?;
/// println!("Status: {}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport that sends through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get the underlying HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Request = reqwest::Request;
    type Response = reqwest::Response;
    type Error = ReqwestTransportError;

    async fn send(
        &self,
        request: &reqwest::Request,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, ReqwestTransportError> {
        let request = request
            .try_clone()
            .ok_or(ReqwestTransportError::NonReplayableRequest)?;

        tokio::select! {
            response = self.client.execute(request) => Ok(response?),
            _ = cancel.cancelled() => Err(ReqwestTransportError::Cancelled),
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
