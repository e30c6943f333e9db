//! `fhir-rekey` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and initialize logging.
//! - Map run failures to stable process exit codes.

mod app;

use app::{run, Cli};
use clap::Parser;
use fhir_rekey_core::{default_log_level, flush_logging, init_logging};
use log::error;
use std::process::ExitCode;

const STDERR_LOG_LEVEL: &str = "warn";

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Stderr carries only warnings by default; file logs keep the build default.
    let fallback_level = if cli.log_dir.is_some() {
        default_log_level()
    } else {
        STDERR_LOG_LEVEL
    };
    let level = cli.log_level.as_deref().unwrap_or(fallback_level);
    if let Err(err) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::from(1);
    }

    let code = match run(&cli) {
        Ok(path) => {
            println!("Wrote transformed bundle to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    };
    flush_logging();
    code
}
