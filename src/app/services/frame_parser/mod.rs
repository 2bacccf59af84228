//! Wire-format parser for ventilator telemetry frames
//!
//! Decodes the compact, comma-delimited, section-tagged ASCII protocol
//! emitted by CPAP and BIPAP firmware. Frames arrive over lossy IoT links,
//! so decoding is deliberately forgiving: malformed content degrades to
//! null fields or string tokens instead of failing the record.
//!
//! ## Architecture
//!
//! - [`splitter`] - Frame tokenization and section grouping
//! - [`mapper`] - Positional section data to named field groups, plus the
//!   device-type dispatch entry point
//! - [`classifier`] - Device-type auto-detection for unlabeled frames
//! - [`stats`] - Decode statistics for batch processing
//!
//! ## Usage
//!
//! ```rust
//! use vent_processor::app::services::frame_parser::parse_device_data;
//!
//! # fn example() -> vent_processor::Result<()> {
//! let frame = "*,S,141125,1447,G,12.2,1.0,H,10.6,10.6,20.0,1.0,#";
//! let record = parse_device_data(frame, "CPAP")?;
//! assert!(record.metadata.is_some());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod mapper;
pub mod splitter;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main entry points for easy access
pub use classifier::{classify, resolve_device_type};
pub use mapper::{map_bipap, map_cpap, parse_device_data, parse_frame};
pub use splitter::split_frame;
pub use stats::ParseStats;
