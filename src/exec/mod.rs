//! Child process execution with trace context injected into argv and env.
//!
//! # Responsibilities
//! - Apply token substitution to the command path and each argument
//! - Append the trace environment rows on top of the inherited environment
//! - Run the child to completion, classifying the outcome
//!
//! # Design Decisions
//! - Standard input/output/error are inherited, so the wrapped command
//!   behaves as if run directly
//! - No timeout or cancellation: the parent blocks until the child exits

use std::process::Command;

use thiserror::Error;

use crate::trace::tokens::TokenResolver;
use crate::version;

/// Errors launching or waiting on the child process.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The child process could not be started.
    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    /// The child exited with a non-zero status code.
    #[error("run command exited with error: {code}")]
    NonZeroExit { code: i32 },

    /// The child was terminated by a signal before exiting.
    #[error("run command was terminated by a signal")]
    Terminated,
}

/// A command with trace tokens resolved and trace environment rows attached.
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl PreparedCommand {
    /// Substitute tokens into the program path and every argument, and build
    /// the environment rows appended to the child (the child additionally
    /// inherits the parent's full environment unmodified).
    pub fn new(resolver: &TokenResolver, program: &str, args: &[String]) -> Self {
        let mut env = resolver.trace_env();
        env.push((
            version::VERSION_ENV.to_string(),
            version::VERSION.to_string(),
        ));
        Self {
            program: resolver.substitute(program),
            args: args.iter().map(|arg| resolver.substitute(arg)).collect(),
            env,
        }
    }

    /// The ready-to-run `Command`, stdio inherited.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().cloned());
        command
    }

    /// Run the child and block until it exits.
    pub fn run(&self) -> Result<(), ExecError> {
        let status = self.command().status().map_err(|source| ExecError::Launch {
            command: self.program.clone(),
            source,
        })?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ExecError::NonZeroExit { code }),
            None => Err(ExecError::Terminated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};

    fn resolver() -> TokenResolver {
        let ctx = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::default(),
            false,
            TraceState::default(),
        );
        TokenResolver::new(&ctx)
    }

    #[test]
    fn test_substitutes_program_and_args() {
        let prepared = PreparedCommand::new(
            &resolver(),
            "/usr/bin/curl",
            &[
                "-H".to_string(),
                "traceparent:$W3CTRACEPARENT".to_string(),
                "https://example.com/info".to_string(),
            ],
        );
        assert_eq!(prepared.program, "/usr/bin/curl");
        assert_eq!(
            prepared.args[1],
            "traceparent:00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00"
        );
        assert_eq!(prepared.args[2], "https://example.com/info");
    }

    #[test]
    fn test_env_rows_include_version_marker() {
        let prepared = PreparedCommand::new(&resolver(), "true", &[]);
        assert_eq!(prepared.env.len(), 6);
        let marker = prepared
            .env
            .iter()
            .find(|(name, _)| name == version::VERSION_ENV)
            .expect("version marker present");
        assert_eq!(marker.1, version::VERSION);
        assert!(prepared
            .env
            .iter()
            .any(|(name, value)| name == "DD_SPAN_ID" && value == &0x00f067aa0ba902b7u64.to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code() {
        let prepared = PreparedCommand::new(
            &resolver(),
            "sh",
            &["-c".to_string(), "exit 3".to_string()],
        );
        match prepared.run() {
            Err(ExecError::NonZeroExit { code }) => assert_eq!(code, 3),
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_success() {
        let prepared = PreparedCommand::new(&resolver(), "true", &[]);
        assert!(prepared.run().is_ok());
    }

    #[test]
    fn test_launch_failure() {
        let prepared =
            PreparedCommand::new(&resolver(), "/nonexistent/opentracer-test-binary", &[]);
        assert!(matches!(prepared.run(), Err(ExecError::Launch { .. })));
    }
}
