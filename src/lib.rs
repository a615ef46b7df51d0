//! opentracer: run a shell command inside an OpenTelemetry span.
//!
//! # Architecture Overview
//! ```text
//!                  ┌────────────────────────────────────────────────┐
//!                  │                   OPENTRACER                   │
//!                  │                                                │
//!  W3CTRACEPARENT  │  ┌───────────┐   ┌───────────┐   ┌───────────┐ │
//!  env (inbound) ──┼─▶│ telemetry │──▶│  cli::run │──▶│   trace   │ │
//!                  │  │ propagate │   │orchestrate│   │tokens/tags│ │
//!                  │  └───────────┘   └─────┬─────┘   └─────┬─────┘ │
//!                  │                        │               │       │
//!                  │                        ▼               ▼       │
//!                  │                  ┌───────────┐  resolved argv  │
//!  child process ◀─┼──────────────────│   exec    │◀─ + trace env   │
//!                  │                  └─────┬─────┘                 │
//!                  │                        │                       │
//!                  │                        ▼                       │
//!  OTLP collector  │  ┌──────────────────────────────────────────┐  │
//!  / trace file  ◀─┼──│ telemetry: span end, flush, shutdown     │  │
//!                  │  └──────────────────────────────────────────┘  │
//!                  └────────────────────────────────────────────────┘
//! ```
//!
//! The `trace` module is the core: trace-context interop (W3C traceparent
//! formatting, Datadog decimal ID mapping) and templating (token
//! substitution, typed tag parsing). Everything else is glue around the
//! OpenTelemetry SDK and the child process.

// Core
pub mod trace;

// Collaborators
pub mod exec;
pub mod telemetry;

// Cross-cutting concerns
pub mod cli;
pub mod output;
pub mod version;

pub use cli::Cli;
pub use trace::{parse_tag, TokenResolver, TraceParent};
