//! opentracer binary: subscriber init, CLI dispatch, exit code.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opentracer::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so the wrapped command's stdout stays clean.
    let default_filter = match &cli.command {
        Commands::Run(opts) if opts.debug => "opentracer=debug",
        _ => "opentracer=info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match &cli.command {
        Commands::Run(opts) => opts.run().map_err(Into::into),
        Commands::Version(opts) => opts.run().map_err(Into::into),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
