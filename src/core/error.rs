//! # Error types
//!
//! This module contains the error types for the [`http_double`] crate.
//!
//! The variants follow the fault taxonomy of the dispatch pipeline: the
//! transport (or the callback behind it), the payload encoding step, verb
//! construction and target validation. An HTTP status outside of `2xx` is
//! never an error; it travels back inside [`TransportResponse`].
//!
//! [`http_double`]: ../index.html
//! [`TransportResponse`]: crate::core::TransportResponse

/// Error type of the test-double pipeline.
///
/// # Examples
/// ```
/// use http_double::core::HarnessError;
///
/// fn foo() -> Result<(), HarnessError> {
///   Ok(())
/// }
///
/// foo().map_err(|e| match e {
///   HarnessError::Transport { .. } => println!("Transport error"),
///   HarnessError::Serialization { .. } => println!("Serialization error"),
///   _ => println!("Other error"),
/// });
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// this error is returned when the transport layer (or the mock callback
    /// behind it) fails
    #[error("Transport error: {details}")]
    Transport {
        /// details of the failure
        details: String,
    },

    /// this error is returned when the payload cannot be encoded
    #[error("Serialization error: {details}")]
    Serialization {
        /// details of the failure
        details: String,
    },

    /// this error is returned when a body cannot be decoded
    #[error("Deserialization error: {details}")]
    Deserialization {
        /// details of the failure
        details: String,
    },

    /// this error is returned when no verb is registered for the requested
    /// method token
    #[error("Verb construction error: no verb registered for method `{method}`")]
    VerbConstruction {
        /// requested method token
        method: String,
    },

    /// this error is returned when the request target is not an absolute URI
    #[error("Invalid target `{target}`: {details}")]
    InvalidTarget {
        /// target as passed by the caller
        target: String,

        /// details of the failure
        details: String,
    },

    /// this error is returned by callbacks which observed cancellation
    #[error("Request cancelled")]
    Cancelled,

    /// this error is returned by the application harness boundary
    #[error("Harness error: {details}")]
    Harness {
        /// details of the failure
        details: String,
    },
}

impl HarnessError {
    /// Shorthand used by mock callbacks to fail the transport step.
    pub fn transport<S>(details: S) -> Self
    where
        S: Into<String>,
    {
        Self::Transport {
            details: details.into(),
        }
    }

    pub(crate) fn serialization<S>(details: S) -> Self
    where
        S: Into<String>,
    {
        Self::Serialization {
            details: details.into(),
        }
    }

    pub(crate) fn deserialization<S>(details: S) -> Self
    where
        S: Into<String>,
    {
        Self::Deserialization {
            details: details.into(),
        }
    }
}
