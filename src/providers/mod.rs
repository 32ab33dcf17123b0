//! # Providers module
//!
//! This module contains the payload encoders used by the senders in
//! [`dx::sender`]. It is intended to be used by the [`http_double`] crate.
//!
//! [`dx::sender`]: crate::dx::sender
//! [`http_double`]: ../index.html

#[cfg(feature = "json")]
pub mod serialization_serde;

#[cfg(feature = "soap")]
pub mod serialization_xml;
