//! Device-type auto-detection for unlabeled frames
//!
//! Used by the ingestion path when a gateway omits the device type. The
//! decision order and substrings are a frozen compatibility contract with
//! deployed firmware: CPAP frames carry 4 sections (S, G, H, I), BIPAP
//! frames carry 7 (S, A, B, C, D, E, F), and the lettered-marker count is
//! the fallback when no lexical keyword is present.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::app::models::DeviceType;
use crate::constants::{
    BIPAP_SECTION_COUNT_THRESHOLD, CPAP_SECTION_HINTS, DEVICE_TYPE_BIPAP, DEVICE_TYPE_CPAP,
    KEYWORD_MANUALMODE, KEYWORD_VAPS_MODE, SECTION_MARKER_PATTERN,
};

static SECTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SECTION_MARKER_PATTERN).expect("valid section marker pattern"));

/// Classify a raw frame as CPAP or BIPAP
///
/// Total function: always returns one of the two labels. First match wins:
/// 1. `VAPS_MODE` or `BIPAP` substring present: BIPAP
/// 2. `CPAP` or `MANUALMODE` substring, or all of `G,` / `H,` / `I,`: CPAP
/// 3. Fallback on lettered-marker count: more than 5 is BIPAP, else CPAP
pub fn classify(raw_data: &str) -> DeviceType {
    if raw_data.contains(KEYWORD_VAPS_MODE) || raw_data.contains(DEVICE_TYPE_BIPAP) {
        return DeviceType::Bipap;
    }

    if raw_data.contains(DEVICE_TYPE_CPAP)
        || raw_data.contains(KEYWORD_MANUALMODE)
        || CPAP_SECTION_HINTS.iter().all(|hint| raw_data.contains(hint))
    {
        return DeviceType::Cpap;
    }

    let marker_count = SECTION_MARKER_RE.find_iter(raw_data).count();
    let detected = if marker_count > BIPAP_SECTION_COUNT_THRESHOLD {
        DeviceType::Bipap
    } else {
        DeviceType::Cpap
    };
    debug!(
        "Classified frame by marker count: {} markers -> {}",
        marker_count, detected
    );
    detected
}

/// Resolve the device type for an ingest request
///
/// An explicit, valid label always wins. A missing label falls back to
/// [`classify`]. An explicit but unsupported label falls back to BIPAP,
/// matching the deployed ingestion behavior.
pub fn resolve_device_type(explicit: Option<&str>, raw_data: &str) -> DeviceType {
    match explicit {
        None => classify(raw_data),
        Some(label) => label.parse().unwrap_or(DeviceType::Bipap),
    }
}
