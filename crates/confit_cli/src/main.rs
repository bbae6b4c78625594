//! confit CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success (including "unchanged" and "skipped")
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Render error
//! - 4: Delivery error
//! - 5: Validation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use confit_cli::commands::{self, ArgsError, Cli, Commands};
use confit_deliver::DeliverError;
use confit_render::RenderError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const RENDER_ERROR: u8 = 3;
    pub const DELIVERY_ERROR: u8 = 4;
    pub const VALIDATION_FAILURE: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; diagnostics go to stderr so stdout stays a clean
    // result channel.
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args).await,
        Commands::Apply(args) => commands::apply::execute(args).await,
        Commands::Deliver(args) => commands::deliver::execute(args).await,
        Commands::Task(args) => commands::task::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(deliver) = e.downcast_ref::<DeliverError>() {
        return match deliver {
            DeliverError::ValidationFailed { .. } => ExitCodes::VALIDATION_FAILURE,
            _ => ExitCodes::DELIVERY_ERROR,
        };
    }
    if e.downcast_ref::<RenderError>().is_some() {
        return ExitCodes::RENDER_ERROR;
    }
    if e.downcast_ref::<ArgsError>().is_some() {
        return ExitCodes::INVALID_ARGS;
    }
    ExitCodes::GENERAL_ERROR
}
