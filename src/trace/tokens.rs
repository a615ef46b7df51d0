//! Trace-context token resolution and substitution.
//!
//! # Responsibilities
//! - Map the fixed token set to strings resolved from the active span context
//! - Substitute `$NAME` / `${NAME}` occurrences in command text and arguments
//! - Produce the trace environment rows appended to the child process
//!
//! # Design Decisions
//! - `PARENT_ID` and `DD_PARENT_ID` alias `SPAN_ID` / `DD_SPAN_ID` through a
//!   static alias table; each value is resolved once
//! - Substitution is a single left-to-right pass: resolved values are never
//!   re-scanned, and unrecognized `$NAMES` are left verbatim

use opentelemetry::trace::SpanContext;

use crate::trace::datadog;
use crate::trace::w3c::TraceParent;

/// Token names aliasing another token's resolved value.
const ALIASES: &[(&str, &str)] = &[("PARENT_ID", "SPAN_ID"), ("DD_PARENT_ID", "DD_SPAN_ID")];

/// Environment variables appended to the child process, in order.
const TRACE_ENV_VARS: &[&str] = &[
    "TRACE_ID",
    "SPAN_ID",
    "DD_TRACE_ID",
    "DD_SPAN_ID",
    "W3CTRACEPARENT",
];

/// Substitution table from token names to strings resolved against one span
/// context. Transient: built per invocation and consumed within it.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    entries: Vec<(&'static str, String)>,
}

impl TokenResolver {
    /// Resolve the token table for the given span context.
    ///
    /// A zero-valued context (no active span) resolves to all-zero
    /// identifiers rather than failing. Malformed identifiers cannot occur
    /// for SDK-produced contexts; should decoding fail anyway, the Datadog
    /// tokens fall back to 0 with a warning, matching the vendor convention.
    pub fn new(ctx: &SpanContext) -> Self {
        let trace_hex = format!("{:032x}", ctx.trace_id());
        let span_hex = format!("{:016x}", ctx.span_id());
        let dd_trace = datadog::decode_apm_trace_id(ctx.trace_id()).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to zero Datadog trace id");
            0
        });
        let dd_span = datadog::decode_apm_span_id(ctx.span_id()).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to zero Datadog span id");
            0
        });
        let traceparent = TraceParent::from_span_context(ctx).to_string();

        let mut entries = vec![
            ("TRACE_ID", trace_hex),
            ("SPAN_ID", span_hex),
            ("DD_TRACE_ID", dd_trace.to_string()),
            ("DD_SPAN_ID", dd_span.to_string()),
            ("W3CTRACEPARENT", traceparent),
        ];
        for (alias, canonical) in ALIASES.iter().copied() {
            let value = entries
                .iter()
                .find(|(name, _)| *name == canonical)
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            entries.push((alias, value));
        }
        Self { entries }
    }

    /// Look up a token's resolved value by name.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace every `$NAME` and `${NAME}` occurrence in `text` with the
    /// token's resolved value.
    ///
    /// Single pass, left to right: a resolved value is never re-scanned for
    /// further tokens. Unrecognized names (and unterminated braces) are left
    /// verbatim, so the function is idempotent on text containing no tokens.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(braced) = after.strip_prefix('{') {
                if let Some(end) = braced.find('}') {
                    if let Some(value) = self.resolve(&braced[..end]) {
                        out.push_str(value);
                        rest = &braced[end + 1..];
                        continue;
                    }
                }
                out.push('$');
                rest = after;
                continue;
            }
            // No token name is a prefix of another, so first match wins.
            match self
                .entries
                .iter()
                .find(|(name, _)| after.starts_with(name))
            {
                Some((name, value)) => {
                    out.push_str(value);
                    rest = &after[name.len()..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// The five trace environment rows appended to the child process, each
    /// resolved against this table.
    pub fn trace_env(&self) -> Vec<(String, String)> {
        TRACE_ENV_VARS
            .iter()
            .map(|name| {
                let value = self.resolve(name).unwrap_or_default().to_string();
                ((*name).to_string(), value)
            })
            .collect()
    }
}
