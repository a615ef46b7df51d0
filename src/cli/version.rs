//! The `version` subcommand.

use clap::Args;

use crate::output::{format_output, FormatError, OutputFormat};
use crate::version::VersionDetail;

/// Options for the `version` subcommand.
#[derive(Args, Debug)]
pub struct VersionOptions {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl VersionOptions {
    /// Print version information in the requested format.
    pub fn run(&self) -> Result<(), FormatError> {
        println!("{}", format_output(&VersionDetail::current(), self.output)?);
        Ok(())
    }
}
