//! XML implementation of the [`Serializer`] trait.
//!
//! Payloads are mapped onto an element tree through their `serde` data
//! model, mirroring what reflection-based XML mappers do:
//!
//! - the root element is named after the payload type (last path segment,
//!   generic arguments stripped), `payload` when that is not a valid name;
//! - struct fields and map entries become child elements, in order;
//! - sequence entries become repeated `item` children;
//! - scalars become text and `null` values are omitted.
//!
//! The document is written as UTF-8 with an XML declaration.
//! [`XmlDeserializer`] walks the same tree back through a `serde`
//! deserializer, parsing text into the scalar type the target asks for.
//!
//! # Examples
//! ```
//! use http_double::{core::Serializer as _, providers::serialization_xml::XmlSerializer};
//!
//! #[derive(serde::Serialize)]
//! struct Ping {
//!    host: String,
//! }
//!
//! let body = XmlSerializer.serialize(&Ping { host: "test".into() }).unwrap();
//! let text = String::from_utf8(body).unwrap();
//!
//! assert!(text.contains("<Ping><host>test</host></Ping>"));
//! ```
//!
//! [`Serializer`]: crate::core::Serializer

use std::{fmt::Display, str::FromStr};

use serde::de::{
    self, value::StringDeserializer, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess,
    SeqAccess, VariantAccess, Visitor,
};
use serde_json::Value;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::core::{utils::headers::TEXT_XML_UTF8, HarnessError, Serializer};

/// Element name used for the root when the payload type name is unusable.
pub const FALLBACK_ROOT: &str = "payload";

/// Element name used for every entry of a sequence.
pub const SEQUENCE_ITEM: &str = "item";

/// XML serializer backed by [`xmltree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

impl Serializer for XmlSerializer {
    fn content_type(&self) -> &'static str {
        TEXT_XML_UTF8
    }

    fn serialize<P>(&self, payload: &P) -> Result<Vec<u8>, HarnessError>
    where
        P: serde::Serialize + ?Sized,
    {
        let value =
            serde_json::to_value(payload).map_err(|e| HarnessError::serialization(e.to_string()))?;
        let root = element_from_value(&root_name::<P>(), &value)?;

        let mut bytes = Vec::new();
        root.write_with_config(
            &mut bytes,
            EmitterConfig::new()
                .perform_indent(false)
                .write_document_declaration(true),
        )
        .map_err(|e| HarnessError::serialization(e.to_string()))?;

        Ok(bytes)
    }
}

/// XML decoder for bodies produced by [`XmlSerializer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDeserializer;

impl XmlDeserializer {
    /// Parse the body into an element tree.
    ///
    /// # Errors
    /// Returns [`HarnessError::Deserialization`] when the bytes are not a
    /// well-formed XML document.
    pub fn parse(&self, bytes: &[u8]) -> Result<Element, HarnessError> {
        Element::parse(bytes).map_err(|e| HarnessError::deserialization(e.to_string()))
    }

    /// Decode the body into `T`.
    ///
    /// Text leaves are parsed into whatever scalar `T` asks for, and empty
    /// elements decode as empty strings, sequences or maps. Targets which
    /// do not name a type (`serde_json::Value`) get booleans and numbers
    /// inferred from the text.
    ///
    /// # Errors
    /// Returns [`HarnessError::Deserialization`] when the document is
    /// malformed or does not fit `T`.
    pub fn deserialize<T>(&self, bytes: &[u8]) -> Result<T, HarnessError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let root = self.parse(bytes)?;
        T::deserialize(NodeDeserializer(Node::from_element(&root)))
            .map_err(|e| HarnessError::deserialization(e.to_string()))
    }
}

pub(crate) fn root_name<P>() -> String
where
    P: ?Sized,
{
    let full = std::any::type_name::<P>();
    let base = full.split('<').next().unwrap_or(full);
    let short = base
        .rsplit("::")
        .next()
        .unwrap_or(base)
        .trim_start_matches('&');

    if is_xml_name(short) {
        short.to_string()
    } else {
        FALLBACK_ROOT.to_string()
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn element_from_value(name: &str, value: &Value) -> Result<Element, HarnessError> {
    if !is_xml_name(name) {
        return Err(HarnessError::serialization(format!(
            "`{name}` is not a valid XML element name"
        )));
    }

    let mut element = Element::new(name);
    match value {
        Value::Null => {}
        Value::Bool(flag) => element.children.push(XMLNode::Text(flag.to_string())),
        Value::Number(number) => element.children.push(XMLNode::Text(number.to_string())),
        Value::String(text) if text.is_empty() => {}
        Value::String(text) => element.children.push(XMLNode::Text(text.clone())),
        Value::Array(items) => {
            for item in items.iter().filter(|item| !item.is_null()) {
                let child = element_from_value(SEQUENCE_ITEM, item)?;
                element.children.push(XMLNode::Element(child));
            }
        }
        Value::Object(fields) => {
            for (key, field) in fields.iter().filter(|(_, field)| !field.is_null()) {
                let child = element_from_value(key, field)?;
                element.children.push(XMLNode::Element(child));
            }
        }
    }

    Ok(element)
}

/// Element tree reduced to what the decoder needs.
#[derive(Debug)]
enum Node {
    Empty,
    Text(String),
    Children(Vec<(String, Node)>),
}

impl Node {
    fn from_element(element: &Element) -> Self {
        let children: Vec<(String, Node)> = element
            .children
            .iter()
            .filter_map(|node| match node {
                XMLNode::Element(child) => Some((child.name.clone(), Node::from_element(child))),
                _ => None,
            })
            .collect();

        if !children.is_empty() {
            return Node::Children(children);
        }

        match element.get_text() {
            Some(text) => Node::Text(text.into_owned()),
            None => Node::Empty,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DecodeError(String);

impl de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

struct NodeDeserializer(Node);

impl NodeDeserializer {
    fn text(self, expected: &str) -> Result<String, DecodeError> {
        match self.0 {
            Node::Empty => Ok(String::new()),
            Node::Text(text) => Ok(text),
            Node::Children(_) => Err(DecodeError(format!(
                "expected {expected}, found nested elements"
            ))),
        }
    }

    fn parse<T>(self, expected: &str) -> Result<T, DecodeError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text(expected)?;
        text.trim()
            .parse()
            .map_err(|e| DecodeError(format!("invalid {expected} `{text}`: {e}")))
    }
}

fn is_sequence(children: &[(String, Node)]) -> bool {
    children.iter().all(|(name, _)| name == SEQUENCE_ITEM)
}

fn visit_inferred<'de, V>(text: String, visitor: V) -> Result<V::Value, DecodeError>
where
    V: Visitor<'de>,
{
    if let Ok(flag) = text.parse::<bool>() {
        return visitor.visit_bool(flag);
    }
    if let Ok(number) = text.parse::<u64>() {
        return visitor.visit_u64(number);
    }
    if let Ok(number) = text.parse::<i64>() {
        return visitor.visit_i64(number);
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => visitor.visit_f64(number),
        _ => visitor.visit_string(text),
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer {
    type Error = DecodeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Node::Empty => visitor.visit_map(NodeMap::new(Vec::new())),
            Node::Text(text) => visit_inferred(text, visitor),
            Node::Children(children) if is_sequence(&children) => {
                visitor.visit_seq(NodeSeq::new(children))
            }
            Node::Children(children) => visitor.visit_map(NodeMap::new(children)),
        }
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let text = self.text("char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(DecodeError(format!("invalid char `{text}`"))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.text("string")?)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    // Null fields are never written, so a present element is always `Some`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Node::Empty => visitor.visit_seq(NodeSeq::new(Vec::new())),
            Node::Children(children) => visitor.visit_seq(NodeSeq::new(children)),
            Node::Text(text) => Err(DecodeError(format!(
                "expected a sequence, found text `{text}`"
            ))),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Node::Empty => visitor.visit_map(NodeMap::new(Vec::new())),
            Node::Children(children) => visitor.visit_map(NodeMap::new(children)),
            Node::Text(text) => Err(DecodeError(format!("expected a map, found text `{text}`"))),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Node::Text(variant) => {
                let variant: StringDeserializer<DecodeError> = variant.into_deserializer();
                visitor.visit_enum(variant)
            }
            Node::Children(mut children) if children.len() == 1 => {
                let (name, node) = children.remove(0);
                visitor.visit_enum(NodeEnum { name, node })
            }
            _ => Err(DecodeError("expected a single enum variant".into())),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct NodeSeq {
    items: std::vec::IntoIter<(String, Node)>,
}

impl NodeSeq {
    fn new(items: Vec<(String, Node)>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for NodeSeq {
    type Error = DecodeError;

    fn next_element_seed<S>(&mut self, seed: S) -> Result<Option<S::Value>, Self::Error>
    where
        S: DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some((_, node)) => seed.deserialize(NodeDeserializer(node)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct NodeMap {
    entries: std::vec::IntoIter<(String, Node)>,
    pending: Option<Node>,
}

impl NodeMap {
    fn new(entries: Vec<(String, Node)>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for NodeMap {
    type Error = DecodeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((name, node)) => {
                self.pending = Some(node);
                let key: StringDeserializer<DecodeError> = name.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S>(&mut self, seed: S) -> Result<S::Value, Self::Error>
    where
        S: DeserializeSeed<'de>,
    {
        let node = self
            .pending
            .take()
            .ok_or_else(|| DecodeError("map value requested before its key".into()))?;
        seed.deserialize(NodeDeserializer(node))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct NodeEnum {
    name: String,
    node: Node,
}

impl<'de> EnumAccess<'de> for NodeEnum {
    type Error = DecodeError;
    type Variant = NodeDeserializer;

    fn variant_seed<S>(self, seed: S) -> Result<(S::Value, Self::Variant), Self::Error>
    where
        S: DeserializeSeed<'de>,
    {
        let name: StringDeserializer<DecodeError> = self.name.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, NodeDeserializer(self.node)))
    }
}

impl<'de> VariantAccess<'de> for NodeDeserializer {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<S>(self, seed: S) -> Result<S::Value, Self::Error>
    where
        S: DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Clone)]
    struct Order {
        id: String,
        quantity: u32,
        express: bool,
        tags: Vec<String>,
        note: Option<String>,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Sparse {
        limit: Option<u32>,
        strict: Option<bool>,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    enum Shipping {
        Ground,
        Air { hours: u8 },
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Line {
        sku: String,
        qty: u16,
        price: f64,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Parcel {
        shipping: Shipping,
        fallback: Shipping,
        lines: Vec<Line>,
    }

    fn round_trip<T>(payload: &T) -> T
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de>,
    {
        let bytes = XmlSerializer.serialize(payload).unwrap();
        XmlDeserializer.deserialize(&bytes).unwrap()
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Greeting {
        from: String,
        to: String,
    }

    fn order() -> Order {
        Order {
            id: "A-1".into(),
            quantity: 2,
            express: true,
            tags: vec!["x".into(), "y".into()],
            note: None,
        }
    }

    #[test]
    fn name_root_after_payload_type() {
        assert_eq!(root_name::<Order>(), "Order");
        assert_eq!(root_name::<Vec<Order>>(), "Vec");
        assert_eq!(root_name::<&Order>(), "Order");
        assert_eq!(root_name::<str>(), "str");
    }

    #[test]
    fn fall_back_to_generic_root_name() {
        assert_eq!(root_name::<()>(), FALLBACK_ROOT);
        assert_eq!(root_name::<[u8]>(), FALLBACK_ROOT);
    }

    #[test]
    fn write_declaration_and_fields_in_order() {
        let bytes = XmlSerializer.serialize(&order()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml"));
        assert!(text.contains("utf-8") || text.contains("UTF-8"));
        assert!(text.contains(
            "<Order><id>A-1</id><quantity>2</quantity><express>true</express>\
             <tags><item>x</item><item>y</item></tags></Order>"
        ));
    }

    #[test]
    fn omit_null_fields() {
        let bytes = XmlSerializer.serialize(&order()).unwrap();
        let root = XmlDeserializer.parse(&bytes).unwrap();

        assert!(root.get_child("note").is_none());
        assert_eq!(
            root.get_child("quantity").and_then(|q| q.get_text()).as_deref(),
            Some("2")
        );
    }

    #[test]
    fn decode_string_payload_back() {
        let greeting = Greeting {
            from: "alice".into(),
            to: "bob".into(),
        };
        let bytes = XmlSerializer.serialize(&greeting).unwrap();

        assert_eq!(
            XmlDeserializer.deserialize::<Greeting>(&bytes).unwrap(),
            greeting
        );
    }

    #[test]
    fn decode_typed_scalars_back() {
        assert_eq!(round_trip(&order()), order());
    }

    #[test]
    fn decode_empty_sequence_and_present_option() {
        let sut = Order {
            tags: vec![],
            note: Some(String::new()),
            express: false,
            ..order()
        };

        assert_eq!(round_trip(&sut), sut);
    }

    #[test]
    fn decode_struct_with_only_absent_fields() {
        let sut = Sparse {
            limit: None,
            strict: None,
        };

        assert_eq!(round_trip(&sut), sut);
        assert_eq!(
            round_trip(&Sparse {
                limit: Some(10),
                strict: Some(true)
            }),
            Sparse {
                limit: Some(10),
                strict: Some(true)
            }
        );
    }

    #[test]
    fn decode_enums_and_nested_sequences() {
        let sut = Parcel {
            shipping: Shipping::Air { hours: 4 },
            fallback: Shipping::Ground,
            lines: vec![
                Line {
                    sku: "X-1".into(),
                    qty: 2,
                    price: 9.5,
                },
                Line {
                    sku: "X-2".into(),
                    qty: 1,
                    price: 0.25,
                },
            ],
        };

        assert_eq!(round_trip(&sut), sut);
    }

    #[test]
    fn infer_scalars_for_untyped_values() {
        let sut = serde_json::json!({
            "a": 1,
            "b": true,
            "c": "text",
            "d": -2,
            "e": 1.5,
            "f": [1, 2]
        });

        assert_eq!(round_trip(&sut), sut);
        assert_eq!(round_trip(&serde_json::json!({})), serde_json::json!({}));
    }

    #[test]
    fn report_text_that_does_not_fit_target_type() {
        let bytes = b"<Order><id>A-1</id><quantity>many</quantity><express>true</express></Order>";

        assert!(matches!(
            XmlDeserializer.deserialize::<Order>(bytes),
            Err(HarnessError::Deserialization { .. })
        ));
    }

    #[test]
    fn escape_markup_in_text() {
        let greeting = Greeting {
            from: "<alice & co>".into(),
            to: "bob".into(),
        };
        let bytes = XmlSerializer.serialize(&greeting).unwrap();

        assert_eq!(
            XmlDeserializer.deserialize::<Greeting>(&bytes).unwrap(),
            greeting
        );
    }

    #[test]
    fn reject_keys_that_are_not_element_names() {
        let payload = BTreeMap::from([("1st".to_string(), "value".to_string())]);

        assert!(matches!(
            XmlSerializer.serialize(&payload),
            Err(HarnessError::Serialization { .. })
        ));
    }

    #[test]
    fn report_malformed_document() {
        assert!(matches!(
            XmlDeserializer.parse(b"<open>"),
            Err(HarnessError::Deserialization { .. })
        ));
    }
}
