//! Command-line argument definitions for the telemetry processor
//!
//! This module defines the complete CLI interface using the clap derive
//! API. Each subcommand carries its own validation and verbosity mapping.

use crate::app::models::{DataSource, DeviceType};
use crate::constants::{DEFAULT_PARALLEL_WORKERS, DEVICE_TYPES, FRAME_FILE_PATTERN};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the ventilator telemetry processor
///
/// Decodes captured CPAP/BIPAP telemetry frames into structured NDJSON
/// records for downstream analysis and archival.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vent-processor",
    version,
    about = "Decode CPAP/BIPAP ventilator telemetry captures into structured NDJSON records",
    long_about = "Processes capture files of raw ventilator telemetry frames (the compact \
                  comma-delimited wire format emitted by CPAP/BIPAP firmware) into structured \
                  newline-delimited JSON records. Handles device-type auto-detection, lossy-link \
                  degradation, and broker payload envelopes."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the telemetry processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process capture files into NDJSON records (main command)
    Process(ProcessArgs),
    /// Decode a single frame and print the result
    Inspect(InspectArgs),
    /// Verify token accounting across capture files
    Validate(ValidateArgs),
}

/// Arguments for the process command (main batch ingestion)
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Input capture file or directory of capture files
    ///
    /// Capture files hold one submission per line: either a raw frame
    /// (`*,S,...,#`) or a JSON payload envelope as delivered by the broker.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Capture file or directory to process"
    )]
    pub input_path: Option<PathBuf>,

    /// Output NDJSON file for ingested records
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output NDJSON file (defaults to records.ndjson)"
    )]
    pub output_path: Option<PathBuf>,

    /// Device type to assume for every bare frame
    ///
    /// When omitted, each frame's type is auto-detected from its content.
    #[arg(
        short = 't',
        long = "device-type",
        value_name = "TYPE",
        value_parser = parse_device_type,
        help = "Assume this device type instead of auto-detecting (CPAP or BIPAP)"
    )]
    pub device_type: Option<DeviceType>,

    /// Provenance stamped onto ingested records
    #[arg(
        long = "source",
        value_name = "SOURCE",
        default_value = "direct",
        value_parser = parse_data_source,
        help = "Record provenance: cloud, software or direct"
    )]
    pub data_source: DataSource,

    /// Device status code assumed for bare frames
    #[arg(
        long = "status",
        value_name = "CODE",
        default_value_t = 1,
        help = "Device status code stamped onto bare-frame records"
    )]
    pub device_status: i64,

    /// Glob pattern for capture files when input is a directory
    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "GLOB",
        default_value = FRAME_FILE_PATTERN,
        help = "Capture file pattern for directory inputs"
    )]
    pub pattern: String,

    /// Number of capture files processed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        default_value_t = DEFAULT_PARALLEL_WORKERS,
        help = "Number of parallel workers for processing"
    )]
    pub workers: usize,

    /// Perform a dry run without writing records
    ///
    /// Shows which capture files would be processed without creating output.
    #[arg(long = "dry-run", help = "Show what would be processed without writing records")]
    pub dry_run: bool,

    /// Path to configuration file
    ///
    /// JSON configuration file for defaults. If not specified, looks for
    /// the file under the user config directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the run summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the run summary"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the inspect command (single-frame decoding)
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Frame to decode, passed inline
    #[arg(value_name = "FRAME", help = "Raw frame to decode")]
    pub frame: Option<String>,

    /// Read the frame from a file instead (first non-empty line)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        conflicts_with = "frame",
        help = "Read the frame from a file"
    )]
    pub file: Option<PathBuf>,

    /// Device type to decode as
    ///
    /// When omitted, the type is auto-detected and reported.
    #[arg(
        short = 't',
        long = "device-type",
        value_name = "TYPE",
        value_parser = parse_device_type,
        help = "Decode as this device type instead of auto-detecting"
    )]
    pub device_type: Option<DeviceType>,

    /// Output format for the decoded record
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the decoded record"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for the validate command (token-accounting verification)
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// Input capture file or directory to verify
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Capture file or directory to verify"
    )]
    pub input_path: PathBuf,

    /// Glob pattern for capture files when input is a directory
    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "GLOB",
        default_value = FRAME_FILE_PATTERN,
        help = "Capture file pattern for directory inputs"
    )]
    pub pattern: String,

    /// Fail on any token-accounting violation
    ///
    /// By default violations are reported but the run succeeds.
    #[arg(long = "strict", help = "Exit with an error on any accounting violation")]
    pub strict: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// clap value parser for device type labels
fn parse_device_type(label: &str) -> Result<DeviceType> {
    label.parse().map_err(|_| {
        Error::configuration(format!(
            "Unknown device type '{}'. Supported types: {}",
            label,
            DEVICE_TYPES.join(", ")
        ))
    })
}

/// clap value parser for data source labels
fn parse_data_source(label: &str) -> Result<DataSource> {
    label.parse()
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input_path) = &self.input_path {
            if !input_path.exists() {
                return Err(Error::configuration(format!(
                    "Input path does not exist: {}",
                    input_path.display()
                )));
            }
        }

        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.workers > 100 {
            return Err(Error::configuration("Number of workers cannot exceed 100"));
        }

        if self.pattern.is_empty() {
            return Err(Error::configuration("Capture file pattern cannot be empty"));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl InspectArgs {
    /// Validate the inspect command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.frame.is_none() && self.file.is_none() {
            return Err(Error::configuration(
                "Provide a frame inline or use --file",
            ));
        }

        if let Some(file) = &self.file {
            if !file.exists() {
                return Err(Error::configuration(format!(
                    "Frame file does not exist: {}",
                    file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl ValidateArgs {
    /// Validate the validate command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                self.input_path.display()
            )));
        }

        if self.pattern.is_empty() {
            return Err(Error::configuration("Capture file pattern cannot be empty"));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
