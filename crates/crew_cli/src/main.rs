//! crewforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success (plan produced, possibly with warnings)
//! - 1: Validation or resolution failure
//! - 2: I/O failure (catalog directory unreadable)

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const VALIDATION_FAILURE: u8 = 1;
    pub const IO_FAILURE: u8 = 2;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("crew=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args).await,
        Commands::List(args) => commands::list::execute(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(ExitCodes::VALIDATION_FAILURE)
        }
    }
}
