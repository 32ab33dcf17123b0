//! Client fixtures module.
//!
//! A [`ClientFixture`] arranges one [`MockTransport`] per
//! [`BehaviorProfile`] and wraps each in a sender. Fixtures are built once
//! and handed out by shared reference, typically through a `static
//! OnceLock`, so every test in a suite reuses the same transports.
//!
//! # Examples
//! ```
//! use std::sync::OnceLock;
//!
//! use http_double::{
//!     core::CancellationToken,
//!     dx::{fixture::JsonClientFixture, sender::SendMessage, verbs::Get},
//! };
//!
//! static FIXTURE: OnceLock<JsonClientFixture> = OnceLock::new();
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fixture = FIXTURE.get_or_init(JsonClientFixture::new);
//!
//! let response = fixture
//!     .forbidden()
//!     .send_request::<Get, _>("https://test/index.html", &(), CancellationToken::new())
//!     .await?;
//!
//! assert_eq!(response.status, 403);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::debug;

#[cfg(feature = "json")]
use crate::dx::sender::JsonEnvelope;
#[cfg(feature = "soap")]
use crate::dx::sender::SoapEnvelope;
use crate::{
    dx::sender::{Envelope, MessageSender},
    transport::MockTransport,
};

/// Fixed response behavior bound to a fixture transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorProfile {
    /// `200 OK`
    Success,

    /// `401 Unauthorized`
    Unauthorized,

    /// `403 Forbidden`
    Forbidden,

    /// `407 Proxy Authentication Required`
    ProxyRequired,
}

impl BehaviorProfile {
    /// Every profile, in fixture order.
    pub const ALL: [BehaviorProfile; 4] = [
        BehaviorProfile::Success,
        BehaviorProfile::Unauthorized,
        BehaviorProfile::Forbidden,
        BehaviorProfile::ProxyRequired,
    ];

    /// Status code answered by transports bound to this profile.
    pub fn status_code(&self) -> u16 {
        match self {
            BehaviorProfile::Success => 200,
            BehaviorProfile::Unauthorized => 401,
            BehaviorProfile::Forbidden => 403,
            BehaviorProfile::ProxyRequired => 407,
        }
    }
}

/// Four senders, one per [`BehaviorProfile`], serializing through `E`.
#[derive(Debug)]
pub struct ClientFixture<E> {
    ok: MessageSender<E>,
    unauthorized: MessageSender<E>,
    forbidden: MessageSender<E>,
    proxy_required: MessageSender<E>,
}

/// Fixture of structured-text senders.
#[cfg(feature = "json")]
pub type JsonClientFixture = ClientFixture<JsonEnvelope>;

/// Fixture of XML-envelope senders.
#[cfg(feature = "soap")]
pub type SoapClientFixture = ClientFixture<SoapEnvelope>;

impl<E> ClientFixture<E>
where
    E: Envelope + Default,
{
    /// Arrange the canned status-code transports.
    pub fn new() -> Self {
        Self::arrange_with(|profile| MockTransport::with_status(profile.status_code()))
    }

    /// Arrange the fixture with a custom transport per profile.
    pub fn arrange_with<F>(mut transport_for: F) -> Self
    where
        F: FnMut(BehaviorProfile) -> MockTransport,
    {
        let mut sender = |profile: BehaviorProfile| {
            debug!("arranging {profile:?} transport");
            MessageSender::new(Arc::new(transport_for(profile)))
        };

        Self {
            ok: sender(BehaviorProfile::Success),
            unauthorized: sender(BehaviorProfile::Unauthorized),
            forbidden: sender(BehaviorProfile::Forbidden),
            proxy_required: sender(BehaviorProfile::ProxyRequired),
        }
    }
}

impl<E> Default for ClientFixture<E>
where
    E: Envelope + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ClientFixture<E> {
    /// Sender bound to [`BehaviorProfile::Success`].
    pub fn ok(&self) -> &MessageSender<E> {
        &self.ok
    }

    /// Sender bound to [`BehaviorProfile::Unauthorized`].
    pub fn unauthorized(&self) -> &MessageSender<E> {
        &self.unauthorized
    }

    /// Sender bound to [`BehaviorProfile::Forbidden`].
    pub fn forbidden(&self) -> &MessageSender<E> {
        &self.forbidden
    }

    /// Sender bound to [`BehaviorProfile::ProxyRequired`].
    pub fn proxy_required(&self) -> &MessageSender<E> {
        &self.proxy_required
    }

    /// Sender bound to `profile`.
    pub fn context(&self, profile: BehaviorProfile) -> &MessageSender<E> {
        match profile {
            BehaviorProfile::Success => &self.ok,
            BehaviorProfile::Unauthorized => &self.unauthorized,
            BehaviorProfile::Forbidden => &self.forbidden,
            BehaviorProfile::ProxyRequired => &self.proxy_required,
        }
    }

    /// Transport behind the sender bound to `profile`.
    pub fn transport(&self, profile: BehaviorProfile) -> &Arc<MockTransport> {
        self.context(profile).transport()
    }
}
