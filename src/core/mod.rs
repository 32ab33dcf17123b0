//! # Core
//!
//! Core functionality of the test-double client.
//!
//! The `core` module contains the request/response envelopes, the
//! [`Transport`] and [`Serializer`] seams and the error type shared by every
//! other module of the [`http_double`] crate.
//!
//! [`http_double`]: ../index.html

pub use cancel::CancellationToken;
pub mod cancel;

pub use error::HarnessError;
pub mod error;

pub use transport::Transport;
pub mod transport;

pub use transport_request::{TransportMethod, TransportRequest};
pub mod transport_request;

pub use transport_response::TransportResponse;
pub mod transport_response;

pub use serialize::Serializer;
pub mod serialize;

pub(crate) mod utils;
