//! Command-line interface definitions and subcommand orchestration.

pub mod run;
pub mod version;

use clap::{Parser, Subcommand};

/// opentracer executes a shell command inside an OpenTelemetry span.
#[derive(Parser, Debug)]
#[command(
    name = "opentracer",
    version,
    about = "Run a shell command inside an OpenTelemetry span",
    long_about = "Invoke a shell command inside an OpenTelemetry span.\n\n\
        opentracer performs token replacement on the command text before executing it,\n\
        exports the same tokens as environment variables so scripts inside the command\n\
        can reference the trace context, and propagates trace lineage through the\n\
        W3CTRACEPARENT environment variable so nested opentracer invocations create\n\
        child spans automatically."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command inside an open trace and span
    Run(run::RunOptions),
    /// Show version information
    Version(version::VersionOptions),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_trailing_command_flags() {
        let cli = Cli::try_parse_from([
            "opentracer",
            "run",
            "--trace-log-file",
            "/tmp/trace.log",
            "--tag",
            "client:acme",
            "curl",
            "-kv",
            "https://example.com",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(opts) => {
                assert_eq!(opts.tags, vec!["client:acme"]);
                assert_eq!(opts.command, vec!["curl", "-kv", "https://example.com"]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_version_output_flag() {
        let cli = Cli::try_parse_from(["opentracer", "version", "-o", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Version(_)));
    }
}
