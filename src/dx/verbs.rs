//! Verbs module.
//!
//! A verb is nothing but a method token. The marker types in this module
//! carry that token as [`Verb::METHOD`], which lets call sites pick a verb
//! by type (`send_request::<Put, _>(..)`), while [`Invoker`] is the single
//! piece of code that actually dispatches.
//!
//! Adding a verb means declaring a marker type, implementing [`Verb`] for it
//! and registering its token in [`VERBS`] so it can also be selected by
//! name.
//!
//! Verbs do not intercept failures: whatever the transport returns, `Ok` or
//! `Err`, is handed back to the caller as is.

use log::{debug, warn};

use crate::core::{
    CancellationToken, HarnessError, Transport, TransportMethod, TransportRequest,
    TransportResponse,
};

/// Method token carried by a verb marker type.
pub trait Verb: Send + Sync + 'static {
    /// Method stamped onto every request dispatched through this verb.
    const METHOD: TransportMethod;
}

/// `GET` verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct Get;

/// `PUT` verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct Put;

/// `POST` verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct Post;

/// `DELETE` verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delete;

/// `PATCH` verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct Patch;

impl Verb for Get {
    const METHOD: TransportMethod = TransportMethod::Get;
}

impl Verb for Put {
    const METHOD: TransportMethod = TransportMethod::Put;
}

impl Verb for Post {
    const METHOD: TransportMethod = TransportMethod::Post;
}

impl Verb for Delete {
    const METHOD: TransportMethod = TransportMethod::Delete;
}

impl Verb for Patch {
    const METHOD: TransportMethod = TransportMethod::Patch;
}

fn method_of<V: Verb>() -> TransportMethod {
    V::METHOD
}

/// Verbs selectable by method token, resolved at compile time.
pub static VERBS: &[(&str, fn() -> TransportMethod)] = &[
    ("GET", method_of::<Get>),
    ("PUT", method_of::<Put>),
    ("POST", method_of::<Post>),
    ("DELETE", method_of::<Delete>),
    ("PATCH", method_of::<Patch>),
];

/// Resolve a method token (case-insensitive) through [`VERBS`].
///
/// # Errors
/// Returns [`HarnessError::VerbConstruction`] when no verb is registered
/// for `token`.
pub fn method_for(token: &str) -> Result<TransportMethod, HarnessError> {
    VERBS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, method)| method())
        .ok_or_else(|| HarnessError::VerbConstruction {
            method: token.into(),
        })
}

/// Verb bound to a transport for a single dispatch.
///
/// The invoker borrows the transport; many invokers may share one transport
/// which outlives all of them.
#[derive(Debug)]
pub struct Invoker<'t, T>
where
    T: ?Sized,
{
    method: TransportMethod,
    transport: &'t T,
}

impl<'t, T> Invoker<'t, T>
where
    T: Transport + ?Sized,
{
    /// Construct the invoker for verb `V`.
    pub fn new<V>(transport: &'t T) -> Self
    where
        V: Verb,
    {
        Self {
            method: V::METHOD,
            transport,
        }
    }

    /// Construct the invoker for the verb registered under `method`.
    ///
    /// # Errors
    /// Returns [`HarnessError::VerbConstruction`] when no verb is registered
    /// for the token. The transport is not touched in that case.
    pub fn by_name(method: &str, transport: &'t T) -> Result<Self, HarnessError> {
        let method = method_for(method).map_err(|err| {
            warn!("{err}");
            err
        })?;

        Ok(Self { method, transport })
    }

    /// Method this invoker stamps onto requests.
    pub fn method(&self) -> TransportMethod {
        self.method
    }

    /// Set the method on `request` and forward it to the transport.
    ///
    /// The request body and headers must already be populated.
    pub async fn invoke(
        self,
        mut request: TransportRequest,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError> {
        request.method = Some(self.method);
        debug!("dispatching {} {}", self.method, request.target);

        self.transport.send(request, cancellation).await
    }
}
