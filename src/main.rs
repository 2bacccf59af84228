use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;
use vent_processor::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Set up graceful shutdown handling
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");

            // Cancel all operations when Ctrl+C is received
            cancellation_token.cancel();
        };

        // Run the main command with cancellation support
        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(vent_processor::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Vent Processor - Ventilator Telemetry Frame Decoder");
    println!("===================================================");
    println!();
    println!("Decode captured CPAP/BIPAP ventilator telemetry frames (the compact");
    println!("comma-delimited device wire format) into structured NDJSON records.");
    println!();
    println!("USAGE:");
    println!("    vent-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Process capture files into NDJSON records (main command)");
    println!("    inspect     Decode a single frame and print the result");
    println!("    validate    Verify token accounting across capture files");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process a directory of gateway capture files:");
    println!("    vent-processor process --input /var/captures --output records.ndjson");
    println!();
    println!("    # Decode one frame, auto-detecting the device type:");
    println!("    vent-processor inspect \"*,S,141125,1447,G,12.2,1.0,#\"");
    println!();
    println!("    # Verify decoder accounting over a capture set:");
    println!("    vent-processor validate --input /var/captures --strict");
    println!();
    println!("For detailed help on any command, use:");
    println!("    vent-processor <COMMAND> --help");
}
