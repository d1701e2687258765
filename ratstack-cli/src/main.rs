use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ratstack::config::get_config;
use ratstack::host::StdHost;
use ratstack::vm::{run_program, EngineOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run a ratstack program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a ratstack program.
    #[arg()]
    file: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Program output owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&get_config().log_filter))
        .with_writer(std::io::stderr)
        .init();

    let source = std::fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file))?;

    match run_program(&args.file, &source, EngineOptions::default(), StdHost::stdio()) {
        Ok(result) => {
            debug!(termination = ?result.termination, "program finished");
            Ok(ExitCode::SUCCESS)
        }
        // The error and the state have already been printed.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
