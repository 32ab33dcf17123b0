//! Headers module
//!
//! This module provides constants for HTTP headers.
//!

#[cfg(any(feature = "json", feature = "soap"))]
pub(crate) const CONTENT_TYPE: &str = "Content-Type";
#[cfg(feature = "soap")]
pub(crate) const SOAP_ACTION: &str = "SOAPAction";
#[cfg(feature = "json")]
pub(crate) const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
#[cfg(feature = "soap")]
pub(crate) const TEXT_XML_UTF8: &str = "text/xml; charset=utf-8";
