//! Output formatting for read-only commands.
//!
//! Text output uses the value's `Display`; json and yaml go through serde.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Errors serializing a value for output.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to render json output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render yaml output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Render a value in the requested format.
pub fn format_output<T>(value: &T, format: OutputFormat) -> Result<String, FormatError>
where
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => Ok(value.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionDetail;

    #[test]
    fn test_text_uses_display() {
        let out = format_output(&VersionDetail::current(), OutputFormat::Text).unwrap();
        assert!(out.starts_with("opentracer "));
    }

    #[test]
    fn test_json_round_trips() {
        let out = format_output(&VersionDetail::current(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["app_name"], "opentracer");
    }

    #[test]
    fn test_yaml_contains_fields() {
        let out = format_output(&VersionDetail::current(), OutputFormat::Yaml).unwrap();
        assert!(out.contains("app_name: opentracer"));
    }
}
