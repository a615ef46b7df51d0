//! Span tag parsing: `key:value[:type]` strings into typed attributes.
//!
//! # Responsibilities
//! - Split raw `--tag` strings and validate the declared type
//! - Resolve trace-context tokens inside the value before conversion
//! - Produce OpenTelemetry `KeyValue` attributes
//!
//! # Design Decisions
//! - Fewer than two parts or an unknown type is a fatal error, surfaced
//!   before any process is spawned
//! - A value that fails numeric/bool conversion falls back to a string
//!   attribute holding the substituted value, with a warning; the source
//!   tool did this silently and downstream dashboards rely on the tag still
//!   arriving

use std::str::FromStr;

use opentelemetry::KeyValue;
use thiserror::Error;

use crate::trace::tokens::TokenResolver;

/// Errors turning a raw tag string into a typed attribute.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagParseError {
    /// The raw string had fewer than two colon-delimited parts.
    #[error("must specify key:value (or optionally key:value:type): '{0}'")]
    MissingValue(String),

    /// The declared type was not one of the supported attribute types.
    #[error("invalid attribute type '{typ}' in tag '{raw}': expected one of string|bool|int|int32|int64")]
    InvalidType { raw: String, typ: String },
}

/// The supported attribute value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    Int32,
    Int64,
}

impl FromStr for AttributeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(AttributeType::String),
            "bool" => Ok(AttributeType::Bool),
            "int" => Ok(AttributeType::Int),
            "int32" => Ok(AttributeType::Int32),
            "int64" => Ok(AttributeType::Int64),
            _ => Err(()),
        }
    }
}

/// Parse a raw `key:value[:type]` string into a span attribute.
///
/// The value part is passed through token substitution before type
/// conversion, so `--tag request:$TRACE_ID` tags the span with the resolved
/// trace ID. Parts beyond the third are ignored.
pub fn parse_tag(resolver: &TokenResolver, raw: &str) -> Result<KeyValue, TagParseError> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() < 2 {
        return Err(TagParseError::MissingValue(raw.to_string()));
    }

    let key = parts[0].to_string();
    let value = resolver.substitute(parts[1]);
    let attr_type = match parts.get(2) {
        Some(typ) => typ.parse().map_err(|_| TagParseError::InvalidType {
            raw: raw.to_string(),
            typ: (*typ).to_string(),
        })?,
        None => AttributeType::String,
    };

    Ok(coerce(key, value, attr_type))
}

fn coerce(key: String, value: String, attr_type: AttributeType) -> KeyValue {
    match attr_type {
        AttributeType::String => KeyValue::new(key, value),
        AttributeType::Bool => match value.parse::<bool>() {
            Ok(v) => KeyValue::new(key, v),
            Err(_) => string_fallback(key, value, "bool"),
        },
        AttributeType::Int | AttributeType::Int32 => match value.parse::<i32>() {
            Ok(v) => KeyValue::new(key, i64::from(v)),
            Err(_) => string_fallback(key, value, "int32"),
        },
        AttributeType::Int64 => match value.parse::<i64>() {
            Ok(v) => KeyValue::new(key, v),
            Err(_) => string_fallback(key, value, "int64"),
        },
    }
}

fn string_fallback(key: String, value: String, wanted: &str) -> KeyValue {
    tracing::warn!(
        tag = %key,
        value = %value,
        wanted,
        "tag value failed type conversion; keeping it as a string attribute"
    );
    KeyValue::new(key, value)
}
