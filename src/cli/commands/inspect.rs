//! Inspect command implementation
//!
//! Decodes one frame and prints the result, either as a human-readable
//! breakdown or as pretty JSON. Handy when bringing up new firmware or
//! triaging a garbled capture.

use colored::Colorize;
use std::path::Path;
use tracing::debug;

use super::shared::{ProcessingStats, setup_logging};
use crate::app::models::{ParsedRecord, TokenValue};
use crate::app::services::frame_parser::{classify, parse_frame};
use crate::cli::args::{InspectArgs, OutputFormat};
use crate::{Error, Result};

/// Inspect command runner
pub async fn run_inspect(args: InspectArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false)?;
    args.validate()?;

    let frame = resolve_frame(&args)?;
    debug!("Inspecting frame ({} bytes)", frame.len());

    let (device_type, auto_detected) = match args.device_type {
        Some(device_type) => (device_type, false),
        None => (classify(&frame), true),
    };

    let record = parse_frame(&frame, device_type);

    match args.output_format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "device_type": device_type,
                "auto_detected": auto_detected,
                "raw_data": frame,
                "parsed_data": record,
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| Error::serialization("Failed to render inspection", e))?;
            println!("{}", rendered);
        }
        OutputFormat::Human => print_human(&record, device_type.as_str(), auto_detected),
    }

    Ok(ProcessingStats {
        frames_processed: 1,
        ..Default::default()
    })
}

/// The frame to inspect: inline argument or first non-empty file line
fn resolve_frame(args: &InspectArgs) -> Result<String> {
    if let Some(frame) = &args.frame {
        return Ok(frame.clone());
    }

    let path = args
        .file
        .as_deref()
        .ok_or_else(|| Error::configuration("Provide a frame inline or use --file"))?;
    read_first_frame(path)
}

fn read_first_frame(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read frame file {}", path.display()), e))?;

    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
        .ok_or_else(|| {
            Error::configuration(format!("No frame found in {}", path.display()))
        })
}

fn print_human(record: &ParsedRecord, device_type: &str, auto_detected: bool) {
    let detection = if auto_detected { " (auto-detected)" } else { "" };
    println!(
        "{} {}{}",
        "Device type:".bold(),
        device_type.cyan(),
        detection
    );

    println!("{} {}", "Sections:".bold(), record.sections.len());
    for (letter, values) in record.sections.iter() {
        println!("  {}: {}", letter.to_string().cyan(), join_tokens(values));
    }

    if let Some(metadata) = &record.metadata {
        println!("{}", "Metadata".bold());
        print_field("date", &metadata.date);
        print_field("time", &metadata.time);
    }

    if let Some(pressure) = &record.pressure {
        println!("{}", "Pressure".bold());
        print_field("ipap", &pressure.ipap);
        print_field("ramp", &pressure.ramp);
    }

    if let Some(flow) = &record.flow {
        println!("{}", "Flow".bold());
        print_field("max_flow", &flow.max_flow);
        print_field("min_flow", &flow.min_flow);
        print_field("backup_rate", &flow.backup_rate);
        print_field("mode", &flow.mode);
    }

    if let Some(ventilation) = &record.ventilation {
        println!("{}", "Ventilation".bold());
        print_field("ipap", &ventilation.ipap);
        print_field("epap", &ventilation.epap);
        print_field("backup_rate", &ventilation.backup_rate);
        print_field("tidal_volume", &ventilation.tidal_volume);
        print_field("insp_time", &ventilation.insp_time);
        print_field("rise_time", &ventilation.rise_time);
        print_field("trigger", &ventilation.trigger);
        print_field("mode", &ventilation.mode);
    }

    if let Some(settings) = &record.settings {
        println!("{}", "Settings".bold());
        print_field("humidity", &settings.humidity);
        print_field("temperature", &settings.temperature);
        print_field("tube_type", &settings.tube_type);
        print_field("mask_type", &settings.mask_type);
        print_field("trigger", &settings.trigger);
        print_field("cycle", &settings.cycle);
        print_field("mode", &settings.mode);
    }
}

fn print_field(name: &str, value: &Option<TokenValue>) {
    match value {
        Some(value) => println!("  {}: {}", name, value),
        None => println!("  {}: {}", name, "null".dimmed()),
    }
}

fn join_tokens(values: &[TokenValue]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
