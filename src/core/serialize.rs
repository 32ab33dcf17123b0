//! Serialization module
//!
//! This module provides the [`Serializer`] trait used by senders to turn an
//! arbitrary payload into request body bytes.
//!
//! Implementations live in [`providers`]: structured text through
//! `serde_json` and XML through `xmltree`.
//!
//! [`providers`]: crate::providers

use super::HarnessError;

/// Payload encoding strategy.
///
/// # Examples
/// ```
/// use http_double::core::{HarnessError, Serializer};
///
/// struct Debugging;
///
/// impl Serializer for Debugging {
///     fn content_type(&self) -> &'static str {
///         "text/plain"
///     }
///
///     fn serialize<P>(&self, _payload: &P) -> Result<Vec<u8>, HarnessError>
///     where
///         P: serde::Serialize + ?Sized,
///     {
///         Ok(b"opaque".to_vec())
///     }
/// }
///
/// assert_eq!(Debugging.serialize(&1).unwrap(), b"opaque".to_vec());
/// ```
pub trait Serializer: Send + Sync {
    /// Media type of the produced body, including the charset.
    fn content_type(&self) -> &'static str;

    /// Serialize `payload` into body bytes.
    ///
    /// # Errors
    /// Should return [`HarnessError::Serialization`] if the value cannot be
    /// represented in the target encoding.
    fn serialize<P>(&self, payload: &P) -> Result<Vec<u8>, HarnessError>
    where
        P: serde::Serialize + ?Sized;
}
