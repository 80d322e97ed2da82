//! Common test utilities for pause-keeper integration tests
//!
//! This module provides:
//! - Helpers for building interceptors over a real reqwest client
//! - Wiremock fixtures for rate-limited endpoints
//! - Retry-After header builders

use pause_keeper_core::{InterceptorConfig, ReqwestTransport, RetryInterceptor};
use std::time::{Duration, SystemTime};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Interceptor over a fresh reqwest client, plus the client for building requests.
#[allow(dead_code)]
pub fn interceptor() -> (reqwest::Client, RetryInterceptor<ReqwestTransport>) {
    interceptor_with_config(InterceptorConfig::default())
}

/// Interceptor with a custom configuration.
#[allow(dead_code)]
pub fn interceptor_with_config(
    config: InterceptorConfig,
) -> (reqwest::Client, RetryInterceptor<ReqwestTransport>) {
    let client = reqwest::Client::new();
    let interceptor = RetryInterceptor::with_config(ReqwestTransport::new(client.clone()), config)
        .expect("valid test configuration");
    (client, interceptor)
}

/// HTTP date `offset` from now, truncated to whole seconds by the format.
#[allow(dead_code)]
pub fn http_date_in(offset: Duration) -> String {
    httpdate::fmt_http_date(SystemTime::now() + offset)
}

/// HTTP date `offset` before now.
#[allow(dead_code)]
pub fn http_date_ago(offset: Duration) -> String {
    httpdate::fmt_http_date(SystemTime::now() - offset)
}

/// Mount a 429 on `GET route` answered `times` times before falling through
/// to a 200 with `body`.
#[allow(dead_code)]
pub async fn mount_rate_limited(
    server: &MockServer,
    route: &str,
    times: u64,
    retry_after: Option<String>,
    body: &str,
) {
    let mut limited = ResponseTemplate::new(429);
    if let Some(value) = retry_after {
        limited = limited.insert_header("retry-after", value.as_str());
    }

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(limited)
        .up_to_n_times(times)
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Build a GET request for `route` on `server`.
#[allow(dead_code)]
pub fn get(client: &reqwest::Client, server: &MockServer, route: &str) -> reqwest::Request {
    client
        .get(format!("{}{}", server.uri(), route))
        .build()
        .expect("valid request")
}
