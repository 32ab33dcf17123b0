//! # Transport Providers Module
//!
//! This module contains the [`Transport`] implementations shipped with the
//! crate. It is intended to be used by the [`http_double`] crate.
//!
//! [`Transport`]: crate::core::Transport
//! [`http_double`]: ../index.html

pub use self::mock::MockTransport;
pub mod mock;
