//! Test fixtures and helpers for frame parser testing
//!
//! Captured field samples from deployed CPAP/BIPAP firmware, shared across
//! the splitter, mapper and classifier test modules.

use crate::app::models::TokenValue;
use crate::constants::{FIELD_DELIMITER, is_framing_marker};

use super::splitter::section_letter;

// Test modules
mod classifier_tests;

/// A fully populated CPAP frame (sections S, G, H, I)
pub const CPAP_FRAME: &str =
    "*,S,141125,1447,G,12.2,1.0,H,10.6,10.6,20.0,1.0,I,5.0,1.0,1.0,1.0,0.0,1.0,1.0,#";

/// A CPAP frame in manual mode, with a leading R section and a trailing
/// device-id token beyond the mapped I positions
pub const CPAP_MANUAL_MODE_FRAME: &str =
    "*,R,141125,1703,MANUALMODE,G,13.6,1.0,H,12.4,12.4,20.0,1.0,I,5.0,1.0,1.0,1.0,0.0,1.0,1.0,12345678,#";

/// A fully populated BIPAP frame (sections S, A, B, C, D, E, F)
pub const BIPAP_FRAME: &str = "*,S,141125,1447,A,12.2,1.0,B,29.6,10.8,10.6,40.0,10.0,10.0,13.0,1.0,C,16.0,10.0,10.0,10.0,10.0,10.0,0.0,200.0,1.0,D,11.0,10.0,10.0,10.0,10.0,10.0,10.0,200.0,1.0,E,20.0,10.0,5.0,10.0,20.0,20.0,1.0,200.0,1.0,170.0,500.0,F,5.0,1.0,1.0,1.0,0.0,1.0,1.0,#";

/// All data tokens of a frame after comma-splitting, excluding framing and
/// section markers, decoded the way the splitter decodes them
pub fn data_tokens(frame: &str) -> Vec<TokenValue> {
    frame
        .split(FIELD_DELIMITER)
        .filter(|token| !is_framing_marker(token))
        .filter(|token| section_letter(token).is_none())
        .map(TokenValue::parse)
        .collect()
}
