//! Command implementations for the telemetry processor CLI
//!
//! This module contains the main command execution logic, progress
//! reporting, and error handling for the CLI interface. Each command is
//! implemented in its own module.

pub mod inspect;
pub mod process;
pub mod shared;
pub mod validate;

// Re-export the main types for convenient access
pub use shared::ProcessingStats;

use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler based on CLI args:
/// - `process`: batch ingestion of capture files into NDJSON records
/// - `inspect`: single-frame decoding for debugging
/// - `validate`: token-accounting verification over capture files
pub async fn run(args: Args, cancellation: CancellationToken) -> Result<ProcessingStats> {
    match args.get_command() {
        Commands::Process(process_args) => process::run_process(process_args, cancellation).await,
        Commands::Inspect(inspect_args) => inspect::run_inspect(inspect_args).await,
        Commands::Validate(validate_args) => validate::run_validate(validate_args).await,
    }
}
