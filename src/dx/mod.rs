//! # Developer Experience
//!
//! This module provides the verb dispatch, the message senders and the
//! behavior-profile fixtures test authors use directly.

pub use verbs::{Delete, Get, Invoker, Patch, Post, Put, Verb};
pub mod verbs;

pub use sender::{Envelope, MessageSender, SendMessage};
#[cfg(feature = "json")]
pub use sender::{JsonClient, JsonEnvelope};
#[cfg(feature = "soap")]
pub use sender::{SoapClient, SoapEnvelope};
pub mod sender;

pub use fixture::{BehaviorProfile, ClientFixture};
#[cfg(feature = "json")]
pub use fixture::JsonClientFixture;
#[cfg(feature = "soap")]
pub use fixture::SoapClientFixture;
pub mod fixture;
