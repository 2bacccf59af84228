//! Application constants for the ventilator telemetry processor
//!
//! This module contains wire-format markers, classifier vocabulary,
//! retry policy, and default values used throughout the application.

// =============================================================================
// Wire Format
// =============================================================================

/// Token marking the start of a frame (filtered wherever it appears)
pub const FRAME_START_MARKER: &str = "*";

/// Token marking the end of a frame (filtered wherever it appears)
pub const FRAME_END_MARKER: &str = "#";

/// Field delimiter within a frame
pub const FIELD_DELIMITER: char = ',';

/// Section letters a CPAP frame is expected to carry
pub const CPAP_SECTIONS: &[char] = &['S', 'G', 'H', 'I'];

/// Section letters a BIPAP frame is expected to carry
pub const BIPAP_SECTIONS: &[char] = &['S', 'A', 'B', 'C', 'D', 'E', 'F'];

// =============================================================================
// Device Type Labels
// =============================================================================

/// Wire label for CPAP devices
pub const DEVICE_TYPE_CPAP: &str = "CPAP";

/// Wire label for BIPAP devices
pub const DEVICE_TYPE_BIPAP: &str = "BIPAP";

/// All supported device type labels
pub const DEVICE_TYPES: &[&str] = &[DEVICE_TYPE_CPAP, DEVICE_TYPE_BIPAP];

// =============================================================================
// Classifier Vocabulary
// =============================================================================
//
// Frozen compatibility contract with deployed device firmware: the match
// order and the exact substrings below must not change.

/// Keyword identifying BIPAP ventilation mode strings
pub const KEYWORD_VAPS_MODE: &str = "VAPS_MODE";

/// Keyword identifying CPAP manual mode strings
pub const KEYWORD_MANUALMODE: &str = "MANUALMODE";

/// Section hints only CPAP frames carry together
pub const CPAP_SECTION_HINTS: &[&str] = &["G,", "H,", "I,"];

/// Pattern counting lettered section markers in a frame
pub const SECTION_MARKER_PATTERN: &str = "[A-Z],";

/// Marker counts above this classify a keyword-less frame as BIPAP
pub const BIPAP_SECTION_COUNT_THRESHOLD: usize = 5;

// =============================================================================
// Ingestion Topic Conventions
// =============================================================================

/// Topic prefix for the `devices/{device_id}/data` convention
pub const TOPIC_PREFIX_DEVICES: &str = "devices";

/// Topic prefix for the `esp32/data{N}` and `esp32/{id}` conventions
pub const TOPIC_PREFIX_ESP32: &str = "esp32";

/// Segment prefix stripped from `esp32/data{N}` topics
pub const TOPIC_DATA_SEGMENT_PREFIX: &str = "data";

/// Prefix for generated device ids when none is supplied
pub const GENERATED_DEVICE_ID_PREFIX: &str = "device_";

// =============================================================================
// Store Retry Policy
// =============================================================================

/// Maximum save attempts before giving up on a record
pub const MAX_SAVE_ATTEMPTS: usize = 3;

/// Linear backoff unit between save attempts (multiplied by attempt number)
pub const SAVE_RETRY_DELAY_MS: u64 = 1000;

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default number of parallel workers
pub const DEFAULT_PARALLEL_WORKERS: usize = 8;

/// Default glob pattern for capture files in an input directory
pub const FRAME_FILE_PATTERN: &str = "*.log";

/// Default output filename for ingested records
pub const RECORDS_OUTPUT_FILENAME: &str = "records.ndjson";

/// Config file name looked up under the user config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Config directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "vent-processor";

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the expected records filename for a capture file stem
pub fn records_filename(stem: &str) -> String {
    format!("{}.ndjson", stem)
}

/// Check whether a token is a framing marker
pub fn is_framing_marker(token: &str) -> bool {
    token == FRAME_START_MARKER || token == FRAME_END_MARKER
}
