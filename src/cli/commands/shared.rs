//! Shared components for CLI commands
//!
//! Common types, logging setup, progress reporting and capture-file
//! discovery used across the command implementations.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Number of capture files processed
    pub files_processed: usize,
    /// Number of frames processed
    pub frames_processed: usize,
    /// Number of records written to the sink
    pub records_written: usize,
    /// Frames ingested as CPAP
    pub cpap_frames: usize,
    /// Frames ingested as BIPAP
    pub bipap_frames: usize,
    /// Blank or unusable input lines skipped
    pub lines_skipped: usize,
    /// Number of errors encountered
    pub errors_encountered: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
    /// Output file sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
}

impl ProcessingStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging for a command
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vent_processor={}", log_level)));

    if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Create a progress bar for capture file processing
pub fn create_progress_bar(len: u64, message: &str) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map_err(|e| Error::configuration(format!("Invalid progress bar template: {}", e)))?
        .progress_chars("#>-");

    let progress = ProgressBar::new(len);
    progress.set_style(style);
    progress.set_message(message.to_string());
    Ok(progress)
}

/// Discover capture files under an input path
///
/// A file input is taken as-is; a directory is walked recursively and
/// filtered by the capture file pattern. Results are sorted for stable
/// processing order.
pub fn discover_capture_files(input_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if input_path.is_file() {
        return Ok(vec![input_path.to_path_buf()]);
    }

    let matcher = Pattern::new(pattern)
        .map_err(|e| Error::configuration(format!("Invalid capture file pattern: {}", e)))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(input_path) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(
                format!("Failed to walk input directory {}", input_path.display()),
                e,
            )
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| matcher.matches(name))
            .unwrap_or(false);
        if matches {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    debug!(
        "Discovered {} capture files under {}",
        files.len(),
        input_path.display()
    );
    Ok(files)
}

/// Derive a device id from a capture file path (its file stem)
pub fn device_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// Check whether an error should abort the whole batch
///
/// Per-record failures are tallied and skipped; infrastructure failures
/// (I/O, configuration, an exhausted store) stop the run.
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Io { .. }
            | Error::Configuration { .. }
            | Error::StoreExhausted { .. }
            | Error::ProcessingInterrupted { .. }
    )
}
