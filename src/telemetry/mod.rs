//! Tracer provider lifecycle and trace export.
//!
//! # Responsibilities
//! - Build an `SdkTracerProvider` with the span's resource attributes and
//!   the configured exporters (OTLP/HTTP collector, JSON-lines file)
//! - Extract an inbound traceparent value into a parent context via the
//!   SDK's standard propagator
//! - Flush and shut the provider down with a bounded timeout
//!
//! # Design Decisions
//! - The provider is an explicitly owned handle passed through the
//!   invocation, never installed as process-wide global state
//! - Shutdown is an explicit flush-and-confirm: `force_flush` followed by a
//!   bounded-timeout shutdown, returning an error on failure instead of
//!   sleeping and hoping the batch drained

pub mod export;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{Tracer, TracerProvider as _};
use opentelemetry::{Context, InstrumentationScope, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions as semconv;
use thiserror::Error;
use url::Url;

use crate::trace::w3c;

/// Errors initializing or tearing down the tracer provider.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP endpoint could not be parsed as a URL.
    #[error("invalid OTLP endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },

    /// The OTLP exporter could not be constructed.
    #[error("failed to build OTLP exporter: {0}")]
    ExporterBuild(#[from] opentelemetry_otlp::ExporterBuildError),

    /// The trace log file could not be created.
    #[error("failed to open trace log file: {0}")]
    LogFile(#[from] std::io::Error),

    /// Spans could not be flushed or the provider failed to shut down.
    #[error("failed to flush spans: {0}")]
    Flush(OTelSdkError),
}

/// Exporter and resource configuration for one invocation.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Value for the span's `service.name` resource attribute.
    pub service_name: String,

    /// Value for the span's `service.version` resource attribute.
    pub service_version: String,

    /// Value for the span's `deployment.environment.name` resource attribute.
    pub deployment_environment: String,

    /// OTLP/HTTP collector endpoint, if any.
    pub otlp_http_endpoint: Option<String>,

    /// JSON-lines trace log file, if any.
    pub trace_log_file: Option<PathBuf>,

    /// Upper bound on the flush-and-shutdown wait after the span ends.
    pub flush_timeout: Duration,
}

/// Owned tracer provider handle with explicit shutdown.
#[derive(Debug)]
pub struct Telemetry {
    provider: SdkTracerProvider,
    flush_timeout: Duration,
}

impl Telemetry {
    /// Build the tracer provider for this invocation.
    ///
    /// Exporters batch spans on a background thread; nothing is transmitted
    /// synchronously here.
    pub fn init(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attributes([
                KeyValue::new(
                    semconv::resource::SERVICE_VERSION,
                    config.service_version.clone(),
                ),
                KeyValue::new(
                    semconv::attribute::DEPLOYMENT_ENVIRONMENT_NAME,
                    config.deployment_environment.clone(),
                ),
            ])
            .build();

        let mut builder = SdkTracerProvider::builder().with_resource(resource);

        if let Some(path) = &config.trace_log_file {
            builder = builder.with_batch_exporter(export::FileSpanExporter::create(path)?);
        }
        if let Some(endpoint) = &config.otlp_http_endpoint {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(normalize_endpoint(endpoint)?)
                .build()?;
            builder = builder.with_batch_exporter(exporter);
        }

        Ok(Self {
            provider: builder.build(),
            flush_timeout: config.flush_timeout,
        })
    }

    /// An instrumentation-scoped tracer for the wrapping span.
    pub fn tracer(&self, name: &'static str, version: &'static str) -> impl Tracer {
        let scope = InstrumentationScope::builder(name)
            .with_version(version)
            .build();
        self.provider.tracer_with_scope(scope)
    }

    /// Flush all pending spans and shut the provider down, waiting at most
    /// the configured timeout.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        self.provider.force_flush().map_err(TelemetryError::Flush)?;
        self.provider
            .shutdown_with_timeout(self.flush_timeout)
            .map_err(TelemetryError::Flush)
    }
}

/// Extract a parent context from a `traceparent` value using the standard
/// W3C propagator. An unparsable value yields a context with no remote span,
/// so the new span simply starts a fresh trace.
pub fn extract_parent_context(traceparent: &str) -> Context {
    let carrier: HashMap<String, String> = [(
        w3c::TRACEPARENT_HEADER.to_string(),
        traceparent.to_string(),
    )]
    .into();
    TraceContextPropagator::new().extract(&carrier)
}

/// Accept the endpoint forms the source tool took: a bare `host:port` gets
/// an `http://` scheme (insecure, like its non-https path), and a URL with
/// no path gets the OTLP traces path appended.
fn normalize_endpoint(raw: &str) -> Result<String, TelemetryError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|source| TelemetryError::Endpoint {
        endpoint: raw.to_string(),
        source,
    })?;
    if url.path() == "/" || url.path().is_empty() {
        url.set_path("/v1/traces");
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TraceContextExt;

    #[test]
    fn test_normalize_bare_authority() {
        assert_eq!(
            normalize_endpoint("localhost:4318").unwrap(),
            "http://localhost:4318/v1/traces"
        );
    }

    #[test]
    fn test_normalize_keeps_https_and_path() {
        assert_eq!(
            normalize_endpoint("https://collector.example.com/v1/traces").unwrap(),
            "https://collector.example.com/v1/traces"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_endpoint("http://[not a host"),
            Err(TelemetryError::Endpoint { .. })
        ));
    }

    #[test]
    fn test_extract_valid_traceparent() {
        let cx = extract_parent_context("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01");
        let span_ctx = cx.span().span_context().clone();
        assert!(span_ctx.is_valid());
        assert!(span_ctx.is_remote());
        assert_eq!(
            format!("{:032x}", span_ctx.trace_id()),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
        assert_eq!(format!("{:016x}", span_ctx.span_id()), "00f067aa0ba902b7");
    }

    #[test]
    fn test_extract_malformed_traceparent_yields_no_active_span() {
        let cx = extract_parent_context("garbage");
        assert!(!cx.has_active_span());
    }
}
