//! Decode statistics for batch frame processing
//!
//! Tracks how a batch of captured frames decoded, for reporting and for
//! deciding whether a capture file is healthy.

use serde::{Deserialize, Serialize};

use crate::app::models::DeviceType;

/// Statistics for one batch of decoded frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total number of frames encountered (non-empty input lines)
    pub total_frames: usize,

    /// Number of frames decoded into records
    pub frames_decoded: usize,

    /// Number of input lines skipped (blank lines)
    pub lines_skipped: usize,

    /// Frames decoded as CPAP
    pub cpap_frames: usize,

    /// Frames decoded as BIPAP
    pub bipap_frames: usize,

    /// Errors raised outside the decode itself (payload or store failures)
    pub errors: Vec<String>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            frames_decoded: 0,
            lines_skipped: 0,
            cpap_frames: 0,
            bipap_frames: 0,
            errors: Vec::new(),
        }
    }

    /// Record a decoded frame under its device type
    pub fn record_decoded(&mut self, device_type: DeviceType) {
        self.frames_decoded += 1;
        match device_type {
            DeviceType::Cpap => self.cpap_frames += 1,
            DeviceType::Bipap => self.bipap_frames += 1,
        }
    }

    /// Merge another batch's statistics into this one
    pub fn merge(&mut self, other: ParseStats) {
        self.total_frames += other.total_frames;
        self.frames_decoded += other.frames_decoded;
        self.lines_skipped += other.lines_skipped;
        self.cpap_frames += other.cpap_frames;
        self.bipap_frames += other.bipap_frames;
        self.errors.extend(other.errors);
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            (self.frames_decoded as f64 / self.total_frames as f64) * 100.0
        }
    }

    /// Check if decoding was mostly successful (>90% success rate)
    pub fn is_successful(&self) -> bool {
        self.success_rate() > 90.0
    }
}

impl Default for ParseStats {
    fn default() -> Self {
        Self::new()
    }
}
