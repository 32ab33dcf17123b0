//! # Mock Transport Implementation
//!
//! This module contains the [`MockTransport`] struct.
//! It answers requests with whatever the callback supplied at construction
//! returns, without any network I/O.
//!
//! The callback is the only customization point: it fully determines status
//! code, headers and body. Errors returned by the callback reach the caller
//! unchanged, and the transport adds neither retries nor timeouts.

use std::{fmt::Debug, future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use log::info;

use crate::core::{
    CancellationToken, HarnessError, Transport, TransportRequest, TransportResponse,
};

type ResponseFn = dyn Fn(TransportRequest, CancellationToken) -> BoxFuture<'static, Result<TransportResponse, HarnessError>>
    + Send
    + Sync;

/// Callback driven [`Transport`].
///
/// Cloning is cheap and clones share the callback. Concurrent use is as safe
/// as the callback itself; the transport adds no locking of its own.
///
/// # Examples
/// ```
/// use http_double::{
///     core::{CancellationToken, Transport, TransportRequest, TransportResponse},
///     transport::MockTransport,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = MockTransport::new(|request: TransportRequest, _cancellation| async move {
///     Ok(TransportResponse::with_status(if request.body.is_some() { 201 } else { 204 }))
/// });
///
/// let response = transport
///     .send(TransportRequest::default(), CancellationToken::new())
///     .await?;
/// assert_eq!(response.status, 204);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<ResponseFn>,
}

impl MockTransport {
    /// Create a transport answering every request through `handler`.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(TransportRequest, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TransportResponse, HarnessError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |request, cancellation| handler(request, cancellation).boxed()),
        }
    }

    /// Create a transport answering every request with `status` and no body.
    pub fn with_status(status: u16) -> Self {
        Self::new(move |_request, _cancellation| async move {
            Ok(TransportResponse::with_status(status))
        })
    }
}

impl Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: TransportRequest,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError> {
        info!(
            "{} {}",
            request.method.map(|m| m.as_str()).unwrap_or("<unset>"),
            request.target
        );
        (self.handler)(request, cancellation).await
    }
}
