//! This module contains the [`TransportResponse`] struct.
//!
//! This struct is used to represent the answer of a [`Transport`]. It is
//! returned to the test author unchanged by verbs and senders.
//!
//! [`Transport`]: crate::core::Transport

use std::collections::HashMap;

/// This struct is used to represent the response produced for a request.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TransportResponse {
    /// status code of the response
    pub status: u16,

    /// headers of the response
    pub headers: HashMap<String, String>,

    /// body of the response
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    /// Response with the given status and nothing else.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Whether the status code is in the `2xx` range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
