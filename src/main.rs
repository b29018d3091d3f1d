use anyhow::{bail, Result};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Outcome;
use config::{Choice, TestConfig};

mod cli;
mod config;
mod error;

fn main() -> Result<ExitCode> {
    init_tracing();

    match cli::run(std::env::args_os().skip(1), execute) {
        Ok(Outcome::Ran(result)) => {
            result?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(Outcome::Help | Outcome::Version) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            debug!(?err, "invalid command line");
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("For more information, try '--help'.");
            Ok(ExitCode::from(err.exit_code()))
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `iotest=info`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("iotest=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Hands the configuration to the benchmark executor.
///
/// Driving the storage cluster lives outside this tool, so for now the plan is reported and
/// printed.
fn execute(config: TestConfig) -> Result<()> {
    if !config.mode().is_runnable() {
        bail!("mode {} can't be run", config.mode());
    }
    info!(
        mode = %config.mode(),
        num_files = config.num_files(),
        file_size = config.file_size(),
        dir = %config.benchmark_dir().display(),
        write_behavior = %config.write_behavior(),
        read_behavior = %config.read_behavior(),
        compression = config.compression().map_or("none", |c| c.as_str()),
        "benchmark configuration resolved"
    );
    println!("{config}");
    Ok(())
}
