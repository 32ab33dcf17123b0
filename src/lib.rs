//! # http_double
//!
//! Deterministic HTTP test doubles.
//!
//! Test code sends a payload to a target through a sender, choosing the verb
//! by type. The sender serializes the payload (structured text or an XML
//! envelope), the verb stamps its method onto the request and a
//! [`MockTransport`] answers with whatever its callback produces. No network
//! is involved.
//!
//! ```
//! use http_double::{
//!     core::CancellationToken,
//!     dx::{JsonClientFixture, Post, SendMessage},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fixture = JsonClientFixture::new();
//!
//! let response = fixture
//!     .proxy_required()
//!     .send_request::<Post, _>(
//!         "https://test/index.html",
//!         &serde_json::json!({ "a": 1 }),
//!         CancellationToken::new(),
//!     )
//!     .await?;
//!
//! assert_eq!(response.status, 407);
//! assert!(!response.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `json` (default): structured-text sender and fixtures.
//! - `soap` (default): XML-envelope sender and fixtures.
//!
//! [`MockTransport`]: crate::transport::MockTransport

pub mod core;
pub mod dx;
pub mod harness;
pub mod providers;
pub mod transport;

#[doc(inline)]
pub use crate::core::{
    CancellationToken, HarnessError, Transport, TransportMethod, TransportRequest,
    TransportResponse,
};
#[doc(inline)]
pub use transport::MockTransport;
