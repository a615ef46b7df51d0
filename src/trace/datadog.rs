//! Conversion of OpenTelemetry identifiers to Datadog's 64-bit decimal form.
//!
//! OpenTelemetry trace and span IDs are 128-bit and 64-bit values carried as
//! lowercase hex strings; Datadog's `X-DATADOG-TRACE-ID` and
//! `X-DATADOG-PARENT-ID` headers carry unsigned 64-bit decimal integers.
//! Mapping a 128-bit trace ID keeps only its low 64 bits — the documented
//! cross-vendor convention, lossy in the presence of trace-ID collisions.
//!
//! The source tool returned 0 on malformed input; here decoding is an
//! explicit `Result` and the caller decides how to recover (the token
//! resolver warns and substitutes 0, preserving wire behavior).

use opentelemetry::trace::{SpanId, TraceId};
use thiserror::Error;

/// Errors decoding a hex identifier into a Datadog u64.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdDecodeError {
    /// The identifier string was empty.
    #[error("empty identifier")]
    Empty,

    /// The identifier was not a valid hexadecimal string.
    #[error("invalid hex identifier: '{0}'")]
    InvalidHex(String),
}

/// Decode a hex trace or span identifier into a Datadog-format u64.
///
/// Identifiers longer than 16 hex characters keep only the rightmost 16,
/// discarding the high-order bits of a 128-bit trace ID.
pub fn decode_apm_id(id: &str) -> Result<u64, IdDecodeError> {
    if id.is_empty() {
        return Err(IdDecodeError::Empty);
    }
    if !id.is_ascii() {
        return Err(IdDecodeError::InvalidHex(id.to_string()));
    }
    let low = if id.len() > 16 {
        &id[id.len() - 16..]
    } else {
        id
    };
    u64::from_str_radix(low, 16).map_err(|_| IdDecodeError::InvalidHex(id.to_string()))
}

/// Decode an OpenTelemetry trace ID into a Datadog u64 trace ID.
pub fn decode_apm_trace_id(id: TraceId) -> Result<u64, IdDecodeError> {
    decode_apm_id(&format!("{id:032x}"))
}

/// Decode an OpenTelemetry span ID into a Datadog u64 span ID.
pub fn decode_apm_span_id(id: SpanId) -> Result<u64, IdDecodeError> {
    decode_apm_id(&format!("{id:016x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_short_id() {
        assert_eq!(decode_apm_id("2a"), Ok(42));
    }

    #[test]
    fn test_decode_matches_left_padded_form() {
        assert_eq!(decode_apm_id("2a"), decode_apm_id("000000000000002a"));
        assert_eq!(decode_apm_id("f"), decode_apm_id("000f"));
    }

    #[test]
    fn test_decode_is_stable() {
        let id = "4bf92f3577b34da6a3ce929d0e0e4736";
        assert_eq!(decode_apm_id(id), decode_apm_id(id));
    }

    #[test]
    fn test_decode_truncates_128_bit_trace_id() {
        // Only the rightmost 16 hex characters survive.
        assert_eq!(
            decode_apm_id("4bf92f3577b34da6a3ce929d0e0e4736"),
            Ok(0xa3ce929d0e0e4736)
        );
    }

    #[test]
    fn test_decode_full_span_id() {
        assert_eq!(decode_apm_id("00f067aa0ba902b7"), Ok(0x00f067aa0ba902b7));
    }

    #[test]
    fn test_decode_empty_is_error() {
        assert_eq!(decode_apm_id(""), Err(IdDecodeError::Empty));
    }

    #[test]
    fn test_decode_non_hex_is_error() {
        assert!(matches!(
            decode_apm_id("not-hex"),
            Err(IdDecodeError::InvalidHex(_))
        ));
        assert!(matches!(
            decode_apm_id("ζζζζζζζζζζζζζζζζζ"),
            Err(IdDecodeError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_decode_typed_wrappers() {
        let trace_id = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
        let span_id = SpanId::from_hex("00f067aa0ba902b7").unwrap();
        assert_eq!(decode_apm_trace_id(trace_id), Ok(0xa3ce929d0e0e4736));
        assert_eq!(decode_apm_span_id(span_id), Ok(0x00f067aa0ba902b7));
    }

    #[test]
    fn test_decode_zero_ids() {
        assert_eq!(decode_apm_trace_id(TraceId::INVALID), Ok(0));
        assert_eq!(decode_apm_span_id(SpanId::INVALID), Ok(0));
    }
}
