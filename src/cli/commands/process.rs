//! Process command implementation
//!
//! The main batch ingestion workflow: discover capture files, decode every
//! frame through the ingestion service, and write records to the NDJSON
//! sink with progress reporting and a run summary.

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::shared::{
    ProcessingStats, create_progress_bar, device_id_from_path, discover_capture_files,
    is_critical_error, setup_logging,
};
use crate::app::models::DataSource;
use crate::app::services::frame_parser::ParseStats;
use crate::app::services::ingest::{IngestPayload, Ingestor};
use crate::app::services::store::NdjsonStore;
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::config::ProcessorConfig;
use crate::constants::{RECORDS_OUTPUT_FILENAME, records_filename};
use crate::{Error, Result};

/// Process command runner
///
/// Orchestrates the whole workflow:
/// 1. Set up logging and configuration
/// 2. Discover capture files
/// 3. Ingest files concurrently with progress reporting
/// 4. Report summary statistics
pub async fn run_process(
    args: ProcessArgs,
    cancellation: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting telemetry processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;

    let input_path = config.input_path.clone().ok_or_else(|| {
        Error::configuration("Input path is required (use --input or the config file)")
    })?;
    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(&input_path));

    let files = discover_capture_files(&input_path, &config.frame_file_pattern)?;
    if files.is_empty() {
        warn!(
            "No capture files matching '{}' under {}",
            config.frame_file_pattern,
            input_path.display()
        );
        return Ok(ProcessingStats::default());
    }

    info!("Processing {} capture files", files.len());

    if args.dry_run {
        return run_dry_run(&files, &output_path, args.quiet);
    }

    let store = NdjsonStore::create(&output_path)?;
    let ingestor = Arc::new(Ingestor::new(store, config.clone()));

    let progress = if args.show_progress() {
        Some(create_progress_bar(files.len() as u64, "capture files")?)
    } else {
        None
    };

    // Device type override applies to bare frames only; payload lines carry
    // their own declaration
    let device_type_override = args.device_type.map(|device_type| device_type.as_str());

    let results: Vec<(PathBuf, Result<ParseStats>)> = stream::iter(files.into_iter().map(|file| {
        let ingestor = Arc::clone(&ingestor);
        let cancellation = cancellation.clone();
        let progress = progress.clone();
        let source = config.data_source;
        let device_status = args.device_status;

        async move {
            let result = if cancellation.is_cancelled() {
                Err(Error::processing_interrupted("Shutdown requested"))
            } else {
                process_capture_file(&ingestor, &file, device_type_override, device_status, source)
                    .await
            };

            if let Some(progress) = &progress {
                progress.inc(1);
            }
            (file, result)
        }
    }))
    .buffer_unordered(config.effective_workers())
    .collect()
    .await;

    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }

    // Aggregate per-file results
    let mut parse_stats = ParseStats::new();
    let mut files_processed = 0;
    for (file, result) in results {
        match result {
            Ok(file_stats) => {
                files_processed += 1;
                debug!(
                    "Completed {}: {}/{} frames decoded",
                    file.display(),
                    file_stats.frames_decoded,
                    file_stats.total_frames
                );
                parse_stats.merge(file_stats);
            }
            Err(e) if is_critical_error(&e) => {
                error!("Aborting: {}", e);
                return Err(e);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                parse_stats.errors.push(format!("{}: {}", file.display(), e));
            }
        }
    }

    let mut stats = ProcessingStats {
        files_processed,
        frames_processed: parse_stats.total_frames,
        records_written: parse_stats.frames_decoded,
        cpap_frames: parse_stats.cpap_frames,
        bipap_frames: parse_stats.bipap_frames,
        lines_skipped: parse_stats.lines_skipped,
        errors_encountered: parse_stats.errors.len(),
        processing_time: start_time.elapsed(),
        output_sizes: Vec::new(),
    };

    if let Ok(metadata) = std::fs::metadata(&output_path) {
        stats
            .output_sizes
            .push((output_path.display().to_string(), metadata.len()));
    }

    info!(
        "Ingested {} records from {} frames across {} files",
        stats.records_written, stats.frames_processed, stats.files_processed
    );

    print_summary(&stats, &output_path, args.output_format, args.quiet)?;
    Ok(stats)
}

/// Ingest every line of one capture file
///
/// Lines are either raw frames or JSON payload envelopes; blank lines are
/// skipped. Per-line failures are tallied, infrastructure failures abort
/// the file.
async fn process_capture_file(
    ingestor: &Ingestor<NdjsonStore>,
    path: &Path,
    device_type_override: Option<&str>,
    device_status: i64,
    source: DataSource,
) -> Result<ParseStats> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read capture file {}", path.display()), e))?;

    let device_id = device_id_from_path(path);
    let mut stats = ParseStats::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            stats.lines_skipped += 1;
            continue;
        }

        stats.total_frames += 1;

        let result = if line.starts_with('{') {
            match IngestPayload::from_json(line) {
                Ok(payload) => ingestor.ingest(&payload, source).await,
                Err(e) => Err(e),
            }
        } else {
            ingestor
                .ingest_frame(line, device_type_override, device_id.clone(), device_status, source)
                .await
        };

        match result {
            Ok(record) => stats.record_decoded(record.device_type),
            Err(e) if is_critical_error(&e) => return Err(e),
            Err(e) => {
                debug!("Skipped line in {}: {}", path.display(), e);
                stats.errors.push(e.to_string());
            }
        }
    }

    Ok(stats)
}

/// Default sink path: `<stem>.ndjson` next to a single-file input, the
/// standard records filename otherwise
fn default_output_path(input_path: &Path) -> PathBuf {
    if input_path.is_file() {
        if let Some(stem) = input_path.file_stem().and_then(|stem| stem.to_str()) {
            return PathBuf::from(records_filename(stem));
        }
    }
    PathBuf::from(RECORDS_OUTPUT_FILENAME)
}

/// Dry run: list the files that would be processed
fn run_dry_run(files: &[PathBuf], output_path: &Path, quiet: bool) -> Result<ProcessingStats> {
    if !quiet {
        println!(
            "{} {} capture files -> {}",
            "Would process".cyan().bold(),
            files.len(),
            output_path.display()
        );
        for file in files {
            println!("  {}", file.display());
        }
    }

    Ok(ProcessingStats {
        files_processed: files.len(),
        ..Default::default()
    })
}

/// Layered configuration: defaults, optional config file, CLI overrides
fn load_configuration(args: &ProcessArgs) -> Result<ProcessorConfig> {
    info!("Loading configuration");

    let default_config_path = if args.config_file.is_none() {
        ProcessorConfig::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        info!("No config file found, using defaults");
    }

    let mut config = ProcessorConfig::load_layered(
        args.input_path.clone(),
        args.output_path.clone(),
        config_file,
    )?;

    // Apply CLI argument overrides
    config.workers = args.workers;
    config.frame_file_pattern = args.pattern.clone();
    config.data_source = args.data_source;

    config.validate()?;
    Ok(config)
}

/// Print the run summary in the requested format
fn print_summary(
    stats: &ProcessingStats,
    output_path: &Path,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "files_processed": stats.files_processed,
                "frames_processed": stats.frames_processed,
                "records_written": stats.records_written,
                "cpap_frames": stats.cpap_frames,
                "bipap_frames": stats.bipap_frames,
                "lines_skipped": stats.lines_skipped,
                "errors_encountered": stats.errors_encountered,
                "elapsed_ms": stats.processing_time.as_millis() as u64,
                "output": output_path.display().to_string(),
                "output_bytes": stats.total_output_size(),
            });
            let rendered = serde_json::to_string_pretty(&summary)
                .map_err(|e| Error::serialization("Failed to render summary", e))?;
            println!("{}", rendered);
        }
        OutputFormat::Human => {
            if quiet {
                return Ok(());
            }
            println!();
            println!("{}", "Processing complete".green().bold());
            println!("  Capture files: {}", stats.files_processed);
            println!(
                "  Frames:        {} ({} CPAP, {} BIPAP, {} blank lines skipped)",
                stats.frames_processed, stats.cpap_frames, stats.bipap_frames, stats.lines_skipped
            );
            println!(
                "  Records:       {} -> {}",
                stats.records_written,
                output_path.display()
            );
            println!(
                "  Output size:   {}",
                ProcessingStats::format_size(stats.total_output_size())
            );
            println!("  Elapsed:       {}", HumanDuration(stats.processing_time));
            if stats.errors_encountered > 0 {
                println!(
                    "  {}",
                    format!("Errors:        {}", stats.errors_encountered).yellow()
                );
            }
        }
    }

    Ok(())
}
