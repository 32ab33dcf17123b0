//! Message sender module.
//!
//! [`MessageSender`] is the entry point test code talks to. It validates the
//! target, lets an [`Envelope`] strategy serialize the payload into a
//! [`TransportRequest`], constructs the requested verb bound to its transport
//! and dispatches.
//!
//! Two envelope strategies share that contract:
//! - [`JsonEnvelope`] writes a structured-text body,
//! - [`SoapEnvelope`] writes an XML document and repeats the target in the
//!   `SOAPAction` header.
//!
//! Senders keep no state between calls. Errors from the serialization step
//! surface as [`HarnessError::Serialization`]; errors from the transport are
//! returned untouched.

use std::{fmt::Debug, sync::Arc};

use log::debug;
#[cfg(any(feature = "json", feature = "soap"))]
use log::trace;

#[cfg(any(feature = "json", feature = "soap"))]
use crate::core::utils::headers::CONTENT_TYPE;
#[cfg(feature = "soap")]
use crate::core::utils::headers::SOAP_ACTION;
#[cfg(feature = "json")]
use crate::providers::serialization_serde::SerdeSerializer;
#[cfg(feature = "soap")]
use crate::providers::serialization_xml::XmlSerializer;
use crate::{
    core::{CancellationToken, HarnessError, Transport, TransportRequest, TransportResponse},
    dx::verbs::{Invoker, Verb},
    transport::MockTransport,
};

/// Strategy turning a target and a payload into a request envelope.
///
/// The envelope leaves `method` unset; it is assigned by the verb.
pub trait Envelope: Send + Sync {
    /// Build the request for `payload` addressed to `target`.
    ///
    /// # Errors
    /// Should return [`HarnessError::Serialization`] when the payload cannot
    /// be encoded.
    fn wrap<P>(&self, target: &str, payload: &P) -> Result<TransportRequest, HarnessError>
    where
        P: serde::Serialize + ?Sized;
}

#[cfg(any(feature = "json", feature = "soap"))]
fn encode<S, P>(serializer: &S, target: &str, payload: &P) -> Result<TransportRequest, HarnessError>
where
    S: crate::core::Serializer,
    P: serde::Serialize + ?Sized,
{
    let body = serializer.serialize(payload)?;
    trace!("encoded {} byte(s) as {}", body.len(), serializer.content_type());

    let mut request = TransportRequest {
        target: target.to_string(),
        body: Some(body),
        ..Default::default()
    };
    request
        .headers
        .insert(CONTENT_TYPE.into(), serializer.content_type().into());

    Ok(request)
}

/// Structured-text (JSON) envelope.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEnvelope;

#[cfg(feature = "json")]
impl Envelope for JsonEnvelope {
    fn wrap<P>(&self, target: &str, payload: &P) -> Result<TransportRequest, HarnessError>
    where
        P: serde::Serialize + ?Sized,
    {
        encode(&SerdeSerializer, target, payload)
    }
}

/// XML envelope with the target repeated as `SOAPAction` header.
#[cfg(feature = "soap")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SoapEnvelope;

#[cfg(feature = "soap")]
impl Envelope for SoapEnvelope {
    fn wrap<P>(&self, target: &str, payload: &P) -> Result<TransportRequest, HarnessError>
    where
        P: serde::Serialize + ?Sized,
    {
        let mut request = encode(&XmlSerializer, target, payload)?;
        request.headers.insert(SOAP_ACTION.into(), target.into());

        Ok(request)
    }
}

/// Dispatch contract shared by every sender.
///
/// # Examples
/// ```
/// use http_double::{
///     core::CancellationToken,
///     dx::{sender::{JsonClient, SendMessage}, verbs::Put},
///     transport::MockTransport,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JsonClient::from_transport(MockTransport::with_status(401));
///
/// let response = client
///     .send_request::<Put, _>("https://test/index.html", &(), CancellationToken::new())
///     .await?;
///
/// assert_eq!(response.status, 401);
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait SendMessage: Send + Sync {
    /// Send `payload` to `target` using verb `V`.
    ///
    /// # Errors
    /// - [`HarnessError::InvalidTarget`] when `target` is not an absolute URI,
    /// - [`HarnessError::Serialization`] when `payload` cannot be encoded,
    /// - any error produced by the transport, unchanged.
    async fn send_request<V, P>(
        &self,
        target: &str,
        payload: &P,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError>
    where
        V: Verb,
        P: serde::Serialize + Sync + ?Sized;

    /// Send `payload` to `target` using the verb registered for `method`.
    ///
    /// # Errors
    /// Same as [`send_request`], plus [`HarnessError::VerbConstruction`]
    /// when `method` has no registered verb.
    ///
    /// [`send_request`]: SendMessage::send_request
    async fn send_request_as<P>(
        &self,
        method: &str,
        target: &str,
        payload: &P,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError>
    where
        P: serde::Serialize + Sync + ?Sized;
}

/// Sender serializing through `E` and dispatching over `T`.
///
/// The transport is shared, not owned: cloning the sender or building
/// several senders over the same `Arc` reuses one transport instance.
pub struct MessageSender<E, T = MockTransport>
where
    T: ?Sized,
{
    transport: Arc<T>,
    envelope: E,
}

/// Structured-text sender.
#[cfg(feature = "json")]
pub type JsonClient<T = MockTransport> = MessageSender<JsonEnvelope, T>;

/// XML-envelope sender.
#[cfg(feature = "soap")]
pub type SoapClient<T = MockTransport> = MessageSender<SoapEnvelope, T>;

impl<E, T> MessageSender<E, T>
where
    E: Envelope,
    T: Transport + ?Sized,
{
    /// Create a sender over a shared transport.
    pub fn new(transport: Arc<T>) -> Self
    where
        E: Default,
    {
        Self::with_envelope(transport, E::default())
    }

    /// Create a sender with an explicit envelope strategy.
    pub fn with_envelope(transport: Arc<T>, envelope: E) -> Self {
        Self {
            transport,
            envelope,
        }
    }

    fn prepare<P>(&self, target: &str, payload: &P) -> Result<TransportRequest, HarnessError>
    where
        P: serde::Serialize + ?Sized,
    {
        validate_target(target)?;
        let request = self.envelope.wrap(target, payload)?;
        debug!("prepared request for {target}");

        Ok(request)
    }
}

impl<E, T> MessageSender<E, T>
where
    T: ?Sized,
{
    /// Transport this sender dispatches over.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }
}

impl<E, T> MessageSender<E, T>
where
    E: Envelope + Default,
    T: Transport,
{
    /// Create a sender owning a fresh shared handle to `transport`.
    pub fn from_transport(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }
}

impl<E, T> Clone for MessageSender<E, T>
where
    E: Clone,
    T: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            envelope: self.envelope.clone(),
        }
    }
}

impl<E, T> Debug for MessageSender<E, T>
where
    E: Debug,
    T: Debug + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSender")
            .field("transport", &self.transport)
            .field("envelope", &self.envelope)
            .finish()
    }
}

#[async_trait::async_trait]
impl<E, T> SendMessage for MessageSender<E, T>
where
    E: Envelope,
    T: Transport + ?Sized,
{
    async fn send_request<V, P>(
        &self,
        target: &str,
        payload: &P,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError>
    where
        V: Verb,
        P: serde::Serialize + Sync + ?Sized,
    {
        let request = self.prepare(target, payload)?;

        Invoker::new::<V>(self.transport.as_ref())
            .invoke(request, cancellation)
            .await
    }

    async fn send_request_as<P>(
        &self,
        method: &str,
        target: &str,
        payload: &P,
        cancellation: CancellationToken,
    ) -> Result<TransportResponse, HarnessError>
    where
        P: serde::Serialize + Sync + ?Sized,
    {
        let invoker = Invoker::by_name(method, self.transport.as_ref())?;
        let request = self.prepare(target, payload)?;

        invoker.invoke(request, cancellation).await
    }
}

fn validate_target(target: &str) -> Result<(), HarnessError> {
    let invalid = |details: &str| HarnessError::InvalidTarget {
        target: target.to_string(),
        details: details.to_string(),
    };

    let (scheme, rest) = target
        .split_once(':')
        .ok_or_else(|| invalid("expected an absolute URI"))?;
    if !scheme.starts_with(|c: char| c.is_ascii_alphabetic()) || rest.is_empty() {
        return Err(invalid("expected an absolute URI"));
    }
    let scheme = scheme
        .parse::<http::uri::Scheme>()
        .map_err(|e| invalid(&e.to_string()))?;

    // Web targets must name a host; other schemes (`urn:`, `mailto:`) need not.
    if matches!(scheme.as_str().to_ascii_lowercase().as_str(), "http" | "https") {
        let authority = rest
            .strip_prefix("//")
            .and_then(|hier| hier.split(&['/', '?', '#'][..]).next())
            .filter(|authority| !authority.is_empty())
            .ok_or_else(|| invalid("expected a host"))?;
        authority
            .parse::<http::uri::Authority>()
            .map_err(|e| invalid(&e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod should {
    use super::*;
    #[cfg(any(feature = "json", feature = "soap"))]
    use crate::core::TransportMethod;
    #[cfg(feature = "json")]
    use crate::dx::verbs::{Delete, Get, Post};
    #[cfg(feature = "soap")]
    use crate::dx::verbs::Put;
    #[cfg(feature = "json")]
    use std::collections::BTreeMap;
    #[cfg(any(feature = "json", feature = "soap"))]
    use std::sync::{Arc, Mutex};
    use test_case::test_case;

    #[cfg(any(feature = "json", feature = "soap"))]
    const TARGET: &str = "https://test/index.html";

    #[cfg(any(feature = "json", feature = "soap"))]
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Clone)]
    struct Order {
        id: String,
        quantity: u32,
    }

    #[cfg(any(feature = "json", feature = "soap"))]
    fn order() -> Order {
        Order {
            id: "A-1".into(),
            quantity: 3,
        }
    }

    #[cfg(any(feature = "json", feature = "soap"))]
    fn recording() -> (MockTransport, Arc<Mutex<Vec<TransportRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let transport = MockTransport::new(move |request: TransportRequest, _| {
            sink.lock().unwrap().push(request);
            async { Ok(TransportResponse::with_status(200)) }
        });

        (transport, seen)
    }

    #[test_case("https://test/index.html" => true; "absolute https")]
    #[test_case("http://localhost:8080/soap" => true; "absolute with port")]
    #[test_case("urn:tempuri:GetOrder" => true; "urn action")]
    #[test_case("https://test/a b" => true; "space in path")]
    #[test_case("https:///index.html" => false; "web scheme without host")]
    #[test_case("HTTPS:index.html" => false; "upper case web scheme without host")]
    #[test_case("https:" => false; "scheme only")]
    #[test_case("1http://test" => false; "scheme starting with digit")]
    #[test_case("/index.html" => false; "relative path")]
    #[test_case("" => false; "empty")]
    #[test_case("not a uri" => false; "garbage")]
    fn validate_targets(target: &str) -> bool {
        validate_target(target).is_ok()
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn send_json_body_to_target() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);

        let response = client
            .send_request::<Post, _>(TARGET, &order(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let request = seen.lock().unwrap().pop().unwrap();
        assert_eq!(request.method, Some(TransportMethod::Post));
        assert_eq!(request.target, TARGET);
        assert_eq!(request.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(request.header(SOAP_ACTION_NAME), None);
        let decoded: Order = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(decoded, order());
    }

    #[cfg(feature = "soap")]
    #[tokio::test]
    async fn send_xml_body_with_action_header() {
        let (transport, seen) = recording();
        let client = SoapClient::from_transport(transport);

        client
            .send_request::<Put, _>(TARGET, &order(), CancellationToken::new())
            .await
            .unwrap();

        let request = seen.lock().unwrap().pop().unwrap();
        assert_eq!(request.method, Some(TransportMethod::Put));
        assert_eq!(request.target, TARGET);
        assert_eq!(request.header(SOAP_ACTION_NAME), Some(TARGET));
        assert_eq!(request.header("Content-Type"), Some("text/xml; charset=utf-8"));
        let decoded: Order = crate::providers::serialization_xml::XmlDeserializer
            .deserialize(request.body.as_deref().unwrap())
            .unwrap();
        assert_eq!(decoded, order());
    }

    #[cfg(any(feature = "json", feature = "soap"))]
    const SOAP_ACTION_NAME: &str = "SOAPAction";

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn change_only_method_when_swapping_verbs() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);

        client
            .send_request::<Get, _>(TARGET, &order(), CancellationToken::new())
            .await
            .unwrap();
        client
            .send_request::<Delete, _>(TARGET, &order(), CancellationToken::new())
            .await
            .unwrap();

        let mut requests = seen.lock().unwrap().clone();
        let second = requests.pop().unwrap();
        let mut first = requests.pop().unwrap();
        assert_eq!(first.method, Some(TransportMethod::Get));
        assert_eq!(second.method, Some(TransportMethod::Delete));
        first.method = second.method;
        assert_eq!(first, second);
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn reject_relative_target_before_dispatch() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);

        let result = client
            .send_request::<Get, _>("/index.html", &order(), CancellationToken::new())
            .await;

        assert!(matches!(result, Err(HarnessError::InvalidTarget { .. })));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn report_serialization_fault_before_dispatch() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);
        let payload = BTreeMap::from([((1, 2), "tuple key")]);

        let result = client
            .send_request::<Post, _>(TARGET, &payload, CancellationToken::new())
            .await;

        assert!(matches!(result, Err(HarnessError::Serialization { .. })));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn report_unknown_verb_before_dispatch() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);

        let result = client
            .send_request_as("TRACE", TARGET, &order(), CancellationToken::new())
            .await;

        assert_eq!(
            result,
            Err(HarnessError::VerbConstruction {
                method: "TRACE".into()
            })
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn dispatch_verb_selected_by_name() {
        let (transport, seen) = recording();
        let client = JsonClient::from_transport(transport);

        client
            .send_request_as("patch", TARGET, &order(), CancellationToken::new())
            .await
            .unwrap();

        let request = seen.lock().unwrap().pop().unwrap();
        assert_eq!(request.method, Some(TransportMethod::Patch));
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn return_transport_error_unchanged() {
        let client = JsonClient::from_transport(MockTransport::new(|_, _| async {
            Err(HarnessError::transport("socket closed"))
        }));

        let result = client
            .send_request::<Get, _>(TARGET, &order(), CancellationToken::new())
            .await;

        assert_eq!(result, Err(HarnessError::transport("socket closed")));
    }

    #[cfg(feature = "soap")]
    #[tokio::test]
    async fn accept_urn_as_soap_action() {
        let (transport, seen) = recording();
        let client = SoapClient::from_transport(transport);

        client
            .send_request::<Put, _>("urn:tempuri:GetOrder", &order(), CancellationToken::new())
            .await
            .unwrap();

        let request = seen.lock().unwrap().pop().unwrap();
        assert_eq!(request.header(SOAP_ACTION_NAME), Some("urn:tempuri:GetOrder"));
    }

    #[test]
    fn expose_transport_behind_trait_object() {
        let transport: std::sync::Arc<dyn Transport> =
            std::sync::Arc::new(MockTransport::with_status(200));
        let sender = MessageSender::with_envelope(transport.clone(), Unwrapped);

        assert!(std::sync::Arc::ptr_eq(sender.transport(), &transport));
    }

    #[derive(Debug, Clone, Copy, Default)]
    struct Unwrapped;

    impl Envelope for Unwrapped {
        fn wrap<P>(&self, target: &str, _payload: &P) -> Result<TransportRequest, HarnessError>
        where
            P: serde::Serialize + ?Sized,
        {
            Ok(TransportRequest {
                target: target.into(),
                ..Default::default()
            })
        }
    }

    #[cfg(feature = "json")]
    #[test]
    fn share_transport_between_senders() {
        let transport = Arc::new(MockTransport::with_status(403));
        let first = JsonClient::new(transport.clone());
        let second = first.clone();

        assert!(Arc::ptr_eq(first.transport(), second.transport()));
        assert!(Arc::ptr_eq(first.transport(), &transport));
    }
}
