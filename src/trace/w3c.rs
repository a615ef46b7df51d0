//! W3C trace-context formatting.
//!
//! # Responsibilities
//! - Render a span context as a `traceparent` header value
//! - Name the header and environment-variable constants shared with the
//!   propagation layer
//!
//! # Design Decisions
//! - Only version "00" of the spec is produced; future versions are out of
//!   scope
//! - Parsing of *incoming* traceparent values is delegated to the SDK's
//!   `TraceContextPropagator` (see `telemetry::extract_parent_context`);
//!   this module only formats outgoing values

use std::fmt;

use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId};

/// Header name carrying the trace parent, per https://w3c.github.io/trace-context/.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name carrying vendor trace state.
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Environment variable used to hand a traceparent value to nested invocations.
pub const TRACEPARENT_ENV: &str = "W3CTRACEPARENT";

/// The trace-context version this tool emits.
pub const SUPPORTED_VERSION: &str = "00";

/// A `traceparent` value: version, trace ID, parent span ID, trace flags.
///
/// Constructed on demand from a [`SpanContext`] immediately before
/// formatting; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParent {
    version: &'static str,
    trace_id: TraceId,
    parent_id: SpanId,
    flags: TraceFlags,
}

impl TraceParent {
    /// Build a trace parent from the given span context.
    ///
    /// An all-zero context (no active span) still formats validly.
    pub fn from_span_context(ctx: &SpanContext) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            trace_id: ctx.trace_id(),
            parent_id: ctx.span_id(),
            flags: ctx.trace_flags(),
        }
    }
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:032x}-{:016x}-{:02x}",
            self.version,
            self.trace_id,
            self.parent_id,
            self.flags.to_u8()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TraceState;

    fn sample_context(flags: TraceFlags) -> SpanContext {
        SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            flags,
            false,
            TraceState::default(),
        )
    }

    #[test]
    fn test_format_not_sampled() {
        let tp = TraceParent::from_span_context(&sample_context(TraceFlags::default()));
        assert_eq!(
            tp.to_string(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00"
        );
    }

    #[test]
    fn test_format_sampled() {
        let tp = TraceParent::from_span_context(&sample_context(TraceFlags::SAMPLED));
        assert_eq!(
            tp.to_string(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
        );
    }

    #[test]
    fn test_zero_context_formats_validly() {
        let tp = TraceParent::from_span_context(&SpanContext::empty_context());
        assert_eq!(
            tp.to_string(),
            "00-00000000000000000000000000000000-0000000000000000-00"
        );
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let ctx = SpanContext::new(
            TraceId::from_hex("0000000000000000000000000000002a").unwrap(),
            SpanId::from_hex("000000000000002a").unwrap(),
            TraceFlags::default(),
            false,
            TraceState::default(),
        );
        let tp = TraceParent::from_span_context(&ctx);
        assert_eq!(
            tp.to_string(),
            "00-0000000000000000000000000000002a-000000000000002a-00"
        );
    }
}
