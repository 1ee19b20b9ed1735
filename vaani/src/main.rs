//! Vaani CLI - Hindi speech-to-text

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vaani::cli::{Cli, run_cli};

fn main() -> ExitCode {
    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    match run_cli(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!(error = ?report, "command failed");
            vaani::report_failure(&report)
        }
    }
}
