//! expvar CLI - variance-reduced Monte Carlo estimators
//!
//! Runs the estimators, prints their estimates and writes one chart each.

use std::process::ExitCode;

use expvar::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose());
    run_cli(args)
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag.
fn setup_logging(verbose: bool) {
    let default = if verbose { "expvar=debug" } else { "expvar=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
