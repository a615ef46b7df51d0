//! The `run` subcommand: the span-wrapping orchestrator.
//!
//! # Data Flow
//! ```text
//! W3CTRACEPARENT env ──▶ propagator ──▶ parent context
//!                                            │
//!                                            ▼
//!                    tracer.start_with_context(span_name)
//!                                            │
//!              ┌─────────────────────────────┤
//!              ▼                             ▼
//!   --tag strings ──▶ tags.rs      TokenResolver ──▶ resolved argv + env
//!              │                             │
//!              ▼                             ▼
//!       span attributes              child process (blocking)
//!                                            │
//!                                            ▼
//!                  span end ──▶ force_flush + bounded shutdown
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use opentelemetry::trace::{Span, Status, Tracer};
use opentelemetry::Context;
use thiserror::Error;

use crate::exec::{ExecError, PreparedCommand};
use crate::telemetry::{self, Telemetry, TelemetryConfig, TelemetryError};
use crate::trace::tags::{parse_tag, TagParseError};
use crate::trace::tokens::TokenResolver;
use crate::trace::w3c;
use crate::version;

const TOKEN_HELP: &str = "\
Supported replacement tokens (bare $NAME or braced ${NAME} syntax):

  TRACE_ID        128-bit trace id as 32 lowercase hex characters
  SPAN_ID         64-bit span id as 16 lowercase hex characters
  PARENT_ID       alias for SPAN_ID
  DD_TRACE_ID     TRACE_ID as a decimal u64 (Datadog X-DATADOG-TRACE-ID)
  DD_SPAN_ID      SPAN_ID as a decimal u64 (Datadog X-DATADOG-PARENT-ID)
  DD_PARENT_ID    alias for DD_SPAN_ID
  W3CTRACEPARENT  W3C trace-context value: 00-<trace>-<span>-<flags>

The same tokens (minus the aliases) are exported as environment variables to
the child process, so nested opentracer invocations continue the trace.";

/// Errors failing a `run` invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("span-name is required")]
    MissingSpanName,

    #[error("at least one of --trace-log-file and --trace-http-endpoint must be set")]
    NoExporter,

    #[error(transparent)]
    Tag(#[from] TagParseError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Options for the `run` subcommand.
#[derive(Args, Debug)]
#[command(after_help = TOKEN_HELP)]
pub struct RunOptions {
    /// Name for the wrapping span
    #[arg(long, default_value = "Run")]
    pub span_name: String,

    /// Value for the span's service tag
    #[arg(long, default_value = version::APP_NAME)]
    pub service: String,

    /// Value for the span's service version tag
    #[arg(long, default_value = version::VERSION)]
    pub service_version: String,

    /// Deployment environment
    #[arg(short = 'e', long, default_value = "prd")]
    pub deployment_environment: String,

    /// Send traces over HTTP to this OTLP collector endpoint
    #[arg(long)]
    pub trace_http_endpoint: Option<String>,

    /// Append trace spans to this file as JSON lines
    #[arg(long)]
    pub trace_log_file: Option<PathBuf>,

    /// Tags in the format key:value[:type], type one of string|bool|int|int32|int64
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Upper bound in milliseconds on waiting for span export after the command completes
    #[arg(long, default_value_t = 5000)]
    pub flush_timeout_ms: u64,

    /// Log the resolved command line. WARNING: this can expose secrets
    #[arg(long)]
    pub debug: bool,

    /// The command to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunOptions {
    fn validate(&self) -> Result<(), RunError> {
        if self.span_name.is_empty() {
            return Err(RunError::MissingSpanName);
        }
        if self.trace_log_file.is_none() && self.trace_http_endpoint.is_none() {
            return Err(RunError::NoExporter);
        }
        Ok(())
    }

    /// Run the wrapped command inside a new span.
    ///
    /// Tag parsing errors are fatal before the child is spawned; launch
    /// failures and non-zero exits are recorded on the span and returned as
    /// the invocation's failure after the span is flushed.
    pub fn run(&self) -> Result<(), RunError> {
        self.validate()?;

        let telemetry = Telemetry::init(&TelemetryConfig {
            service_name: self.service.clone(),
            service_version: self.service_version.clone(),
            deployment_environment: self.deployment_environment.clone(),
            otlp_http_endpoint: self.trace_http_endpoint.clone(),
            trace_log_file: self.trace_log_file.clone(),
            flush_timeout: Duration::from_millis(self.flush_timeout_ms),
        })?;

        let parent_cx = match env::var(w3c::TRACEPARENT_ENV) {
            Ok(value) if !value.is_empty() => {
                tracing::debug!(traceparent = %value, "found trace parent in environment");
                telemetry::extract_parent_context(&value)
            }
            _ => Context::new(),
        };

        let tracer = telemetry.tracer(version::APP_NAME, version::VERSION);
        let mut span = tracer.start_with_context(self.span_name.clone(), &parent_cx);

        let result = self.execute(&mut span);
        if let Err(err) = &result {
            span.record_error(err);
            span.set_status(Status::error(err.to_string()));
        }
        span.end();

        // Bounded flush-and-confirm instead of a fixed post-command sleep.
        telemetry.shutdown()?;
        result
    }

    fn execute(&self, span: &mut impl Span) -> Result<(), RunError> {
        let span_ctx = span.span_context().clone();
        let resolver = TokenResolver::new(&span_ctx);

        let mut attributes = Vec::with_capacity(self.tags.len());
        for raw in &self.tags {
            attributes.push(parse_tag(&resolver, raw)?);
        }
        span.set_attributes(attributes);

        let prepared = PreparedCommand::new(&resolver, &self.command[0], &self.command[1..]);
        if self.debug {
            tracing::debug!(
                program = %prepared.program,
                args = ?prepared.args,
                "running resolved command"
            );
        }
        prepared.run()?;
        Ok(())
    }
}
