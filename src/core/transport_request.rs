//! # Transport Request
//!
//! This module contains the [`TransportRequest`] envelope and the
//! [`TransportMethod`] token stored in it.
//!
//! Envelopes are prepared by a sender (target, body, headers) and completed
//! by a verb, which is the only place that assigns the method.

use std::{collections::HashMap, fmt::Display};

/// The method to use for a request.
///
/// This enum represents the method token a verb stamps onto a
/// [`TransportRequest`] before it is dispatched.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum TransportMethod {
    /// `GET`
    Get,

    /// `PUT`
    Put,

    /// `POST`
    Post,

    /// `DELETE`
    Delete,

    /// `PATCH`
    Patch,
}

impl TransportMethod {
    /// Upper-case method token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMethod::Get => "GET",
            TransportMethod::Put => "PUT",
            TransportMethod::Post => "POST",
            TransportMethod::Delete => "DELETE",
            TransportMethod::Patch => "PATCH",
        }
    }
}

impl Display for TransportMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// This struct represents a request handed to a [`Transport`].
///
/// All fields are representing certain parts of the request that can be used
/// to prepare one. `method` stays `None` until a verb dispatches the
/// envelope.
///
/// [`Transport`]: crate::core::Transport
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TransportRequest {
    /// absolute target address of the request
    pub target: String,

    /// method to use for the request
    pub method: Option<TransportMethod>,

    /// headers to be sent with the request
    pub headers: HashMap<String, String>,

    /// body to be sent with the request
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Header value lookup, case-insensitive on the header name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text, if present and valid.
    pub fn body_str(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }
}

#[cfg(test)]
mod should {
    use super::*;

    #[test]
    fn lookup_header_ignoring_case() {
        let request = TransportRequest {
            headers: HashMap::from([("SOAPAction".to_string(), "urn:x".to_string())]),
            ..Default::default()
        };

        assert_eq!(request.header("soapaction"), Some("urn:x"));
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn start_without_method() {
        assert_eq!(TransportRequest::default().method, None);
    }
}
