//! Serde implementation of the structured-text [`Serializer`].
//!
//! This module provides a `serde_json` serializer used by the JSON sender and
//! the matching decoder for inspecting request bodies inside mock callbacks.
//!
//! # Examples
//! ```
//! use http_double::{core::Serializer as _, providers::serialization_serde::SerdeSerializer};
//!
//! #[derive(serde::Serialize)]
//! struct Foo {
//!    bar: String,
//! }
//!
//! let foo = Foo { bar: "baz".to_string() };
//! assert_eq!(SerdeSerializer.serialize(&foo).unwrap(), b"{\"bar\":\"baz\"}".to_vec());
//! ```
//!
//! [`Serializer`]: crate::core::Serializer

use crate::core::{utils::headers::TEXT_PLAIN_UTF8, HarnessError, Serializer};

/// Structured-text serializer backed by [`serde_json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeSerializer;

impl Serializer for SerdeSerializer {
    fn content_type(&self) -> &'static str {
        TEXT_PLAIN_UTF8
    }

    fn serialize<P>(&self, payload: &P) -> Result<Vec<u8>, HarnessError>
    where
        P: serde::Serialize + ?Sized,
    {
        serde_json::to_vec(payload).map_err(|e| HarnessError::serialization(e.to_string()))
    }
}

/// Structured-text decoder backed by [`serde_json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeDeserializer;

impl SerdeDeserializer {
    /// Decode a body produced by [`SerdeSerializer`].
    ///
    /// # Errors
    /// Returns [`HarnessError::Deserialization`] when the bytes are not valid
    /// for `T`.
    pub fn deserialize<T>(&self, bytes: &[u8]) -> Result<T, HarnessError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        serde_json::from_slice(bytes).map_err(|e| HarnessError::deserialization(e.to_string()))
    }
}
