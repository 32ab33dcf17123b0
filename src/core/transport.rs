//! # Transport module
//!
//! This module contains the [`Transport`] trait.
//!
//! Senders and verbs only talk to a [`Transport`]. The crate ships the
//! callback driven [`MockTransport`]; harness clients implement the same
//! trait.
//!
//! [`MockTransport`]: crate::transport::MockTransport

use super::{CancellationToken, HarnessError, TransportRequest, TransportResponse};

/// This trait is used to hand a prepared request to whatever answers it.
///
/// # Examples
/// ```
/// use http_double::core::{
///     CancellationToken, HarnessError, Transport, TransportRequest, TransportResponse,
/// };
///
/// struct MyTransport;
///
/// #[async_trait::async_trait]
/// impl Transport for MyTransport {
///    async fn send(
///        &self,
///        req: TransportRequest,
///        cancellation: CancellationToken,
///    ) -> Result<TransportResponse, HarnessError> {
///         Ok(TransportResponse::default())
///    }
/// }
/// ```
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response produced for it.
    ///
    /// A response with a non-success status code is still `Ok`.
    ///
    /// # Errors
    /// Should return an [`HarnessError::Transport`] if the request cannot be
    /// answered at all.
    async fn send(
        &self,
        req: TransportRequest,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError>;
}

#[async_trait::async_trait]
impl<T> Transport for std::sync::Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(
        &self,
        req: TransportRequest,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError> {
        (**self).send(req, cancellation).await
    }
}
