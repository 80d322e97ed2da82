//! Blocking front end for [`RetryInterceptor`].
//!
//! There is a single retry implementation. This wrapper drives it on a
//! private runtime with one worker thread that runs the timers, while each
//! calling thread polls its own request. The wrapper is built from an
//! existing interceptor, so blocking and async callers share one pause gate
//! and one coordination lock: a pause started by either side holds both.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

use crate::error::{BlockingError, InterceptorError};
use crate::interceptor::RetryInterceptor;
use crate::transport::Transport;

/// Synchronous `send` for threads outside any async runtime.
///
/// # Examples
///
/// ```no_run
/// use pause_keeper_core::{BlockingRetryInterceptor, ReqwestTransport, RetryInterceptor};
/// use tokio_util::sync::CancellationToken;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = reqwest::Client::new();
/// let interceptor = RetryInterceptor::new(ReqwestTransport::new(client.clone()));
/// let blocking = BlockingRetryInterceptor::new(interceptor.clone())?;
///
/// let request = client.get("https://api.example.com/items").build()?;
/// let response = blocking.send(&request, &CancellationToken::new())?;
/// println!("Status: {}", response.status());
/// # Ok(())
/// # }
/// ```
pub struct BlockingRetryInterceptor<T> {
    inner: RetryInterceptor<T>,
    runtime: Arc<BackgroundRuntime>,
}

/// Runtime that shuts down without blocking when dropped.
///
/// Dropping a plain `Runtime` inside an async context panics; the last
/// wrapper handle may well be dropped there.
#[derive(Debug)]
struct BackgroundRuntime(Option<Runtime>);

impl BackgroundRuntime {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        match &self.0 {
            Some(runtime) => runtime.block_on(future),
            // Only `drop` empties the slot.
            None => unreachable!("runtime used after shutdown"),
        }
    }
}

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

impl<T> Clone for BlockingRetryInterceptor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<T> std::fmt::Debug for BlockingRetryInterceptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingRetryInterceptor")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BlockingRetryInterceptor<T> {
    /// Wrap `inner` for blocking use.
    ///
    /// # Errors
    ///
    /// Returns `BlockingError::Runtime` if the private runtime cannot be built.
    pub fn new(inner: RetryInterceptor<T>) -> Result<Self, BlockingError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pause-keeper-blocking")
            .enable_all()
            .build()?;
        Ok(Self {
            inner,
            runtime: Arc::new(BackgroundRuntime(Some(runtime))),
        })
    }

    /// Get the async interceptor this wrapper drives.
    pub fn interceptor(&self) -> &RetryInterceptor<T> {
        &self.inner
    }

    /// Send `request`, blocking the current thread until a non-429 response,
    /// a transport error, or cancellation.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime; use
    /// [`RetryInterceptor::send`] there instead.
    pub fn send(
        &self,
        request: &T::Request,
        cancel: &CancellationToken,
    ) -> Result<T::Response, InterceptorError<T::Error>> {
        self.runtime.block_on(self.inner.send(request, cancel))
    }
}

#[cfg(test)]
#[path = "blocking_tests.rs"]
mod tests;
