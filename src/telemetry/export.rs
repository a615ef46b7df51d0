//! JSON-lines span export to a local file.
//!
//! Backs `--trace-log-file`: every finished span becomes one JSON object per
//! line, enough to eyeball trace lineage without a collector.

use std::collections::BTreeMap;
use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use opentelemetry::trace::Status;
use opentelemetry::Value;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::trace::{SpanData, SpanExporter};
use serde::Serialize;

/// Span exporter appending JSON lines to a file.
#[derive(Debug)]
pub struct FileSpanExporter {
    writer: Mutex<BufWriter<File>>,
}

impl FileSpanExporter {
    /// Create (truncating) the trace log file.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_batch(&self, batch: &[SpanData]) -> OTelSdkResult {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| OTelSdkError::InternalFailure("trace log writer poisoned".to_string()))?;
        for span in batch {
            let record = SpanRecord::from_span(span);
            let line = serde_json::to_string(&record)
                .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))?;
            writeln!(writer, "{line}")
                .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))?;
        }
        // Flush per batch so the file is complete even if shutdown is skipped.
        writer
            .flush()
            .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))
    }
}

impl SpanExporter for FileSpanExporter {
    fn export(&self, batch: Vec<SpanData>) -> impl Future<Output = OTelSdkResult> + Send {
        std::future::ready(self.write_batch(&batch))
    }

    fn shutdown(&mut self) -> OTelSdkResult {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| OTelSdkError::InternalFailure("trace log writer poisoned".to_string()))?;
        writer
            .flush()
            .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))
    }
}

/// The serialized form of one finished span.
#[derive(Debug, Serialize)]
struct SpanRecord {
    name: String,
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    start_time_unix_nano: u64,
    end_time_unix_nano: u64,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
    attributes: BTreeMap<String, serde_json::Value>,
}

impl SpanRecord {
    fn from_span(span: &SpanData) -> Self {
        let (status, status_message) = match &span.status {
            Status::Unset => ("unset", None),
            Status::Ok => ("ok", None),
            Status::Error { description } => ("error", Some(description.to_string())),
        };
        Self {
            name: span.name.to_string(),
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id: format!("{:016x}", span.parent_span_id),
            start_time_unix_nano: unix_nanos(span.start_time),
            end_time_unix_nano: unix_nanos(span.end_time),
            status,
            status_message,
            attributes: span
                .attributes
                .iter()
                .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
                .collect(),
        }
    }
}

fn unix_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn attribute_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::F64(v) => serde_json::Value::from(*v),
        Value::String(v) => serde_json::Value::from(v.as_str()),
        other => serde_json::Value::from(other.to_string()),
    }
}
