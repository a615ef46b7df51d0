//! Trace-context interop and templating.
//!
//! # Data Flow
//! ```text
//! SpanContext ──▶ datadog.rs (hex → u64 decimal IDs)
//!             ──▶ w3c.rs     (traceparent wire format)
//!                    │
//!                    ▼
//!             tokens.rs (TokenResolver: $TRACE_ID, ${W3CTRACEPARENT}, …)
//!                    │
//!                    ▼
//!             resolved command path / args / child env
//!
//! raw "key:value[:type]" strings ──▶ tags.rs ──▶ typed span attributes
//! ```
//!
//! # Design Decisions
//! - All operations are pure functions over an immutable `SpanContext`
//! - Resolved token values are never re-scanned (no recursive expansion)
//! - The Datadog mapping keeps only the low 64 bits of a 128-bit trace ID;
//!   this is the documented cross-vendor convention, not a bug

pub mod datadog;
pub mod tags;
pub mod tokens;
pub mod w3c;

pub use tags::{parse_tag, AttributeType, TagParseError};
pub use tokens::TokenResolver;
pub use w3c::TraceParent;
