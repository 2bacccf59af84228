//! Characterization tests for device-type auto-detection
//!
//! The heuristic is a frozen compatibility contract with deployed firmware;
//! these tests pin its behavior, including the documented edge cases.

use super::super::classifier::{classify, resolve_device_type};
use super::{BIPAP_FRAME, CPAP_FRAME, CPAP_MANUAL_MODE_FRAME};
use crate::app::models::DeviceType;

#[test]
fn test_vaps_mode_keyword_wins() {
    assert_eq!(classify("*,S,1,2,VAPS_MODE,#"), DeviceType::Bipap);
    // Keyword rule outranks the CPAP section hints
    assert_eq!(classify("G,1,H,1,I,1,VAPS_MODE"), DeviceType::Bipap);
}

#[test]
fn test_bipap_keyword() {
    assert_eq!(classify("BIPAP:*,S,1,2,#"), DeviceType::Bipap);
}

#[test]
fn test_cpap_keyword() {
    assert_eq!(classify("CPAP device payload"), DeviceType::Cpap);
}

#[test]
fn test_manual_mode_keyword() {
    assert_eq!(classify(CPAP_MANUAL_MODE_FRAME), DeviceType::Cpap);
}

#[test]
fn test_cpap_section_hints() {
    assert_eq!(classify("*,S,1,2,G,1,H,1,I,1,#"), DeviceType::Cpap);
    // All three hints are required together
    assert_eq!(classify("*,S,1,2,G,1,H,1,#"), DeviceType::Cpap); // 3 markers, fallback
}

#[test]
fn test_marker_count_fallback() {
    // 7 distinct lettered sections, no keywords: BIPAP
    assert_eq!(classify(BIPAP_FRAME), DeviceType::Bipap);
    assert_eq!(classify("S,1,A,1,B,1,C,1,D,1,E,1,F,1"), DeviceType::Bipap);

    // 4 markers and no keywords would normally hit the section hints; a
    // hint-less 4-marker frame falls back to CPAP
    assert_eq!(classify("S,1,K,1,L,1,M,1"), DeviceType::Cpap);

    // Exactly 6 markers exceeds the threshold of 5
    assert_eq!(classify("S,1,K,1,L,1,M,1,N,1,O,1"), DeviceType::Bipap);

    // Exactly 5 does not
    assert_eq!(classify("S,1,K,1,L,1,M,1,N,1"), DeviceType::Cpap);
}

#[test]
fn test_known_fixtures_classify_correctly() {
    assert_eq!(classify(CPAP_FRAME), DeviceType::Cpap);
    assert_eq!(classify(BIPAP_FRAME), DeviceType::Bipap);
}

#[test]
fn test_empty_and_keywordless_input_defaults_to_cpap() {
    assert_eq!(classify(""), DeviceType::Cpap);
    assert_eq!(classify("no sections here"), DeviceType::Cpap);
}

#[test]
fn test_resolve_explicit_valid_label_wins() {
    // Explicit label bypasses classification even when the data disagrees
    assert_eq!(
        resolve_device_type(Some("CPAP"), BIPAP_FRAME),
        DeviceType::Cpap
    );
    assert_eq!(
        resolve_device_type(Some("BIPAP"), CPAP_FRAME),
        DeviceType::Bipap
    );
}

#[test]
fn test_resolve_missing_label_classifies() {
    assert_eq!(resolve_device_type(None, CPAP_FRAME), DeviceType::Cpap);
    assert_eq!(resolve_device_type(None, BIPAP_FRAME), DeviceType::Bipap);
}

#[test]
fn test_resolve_invalid_label_falls_back_to_bipap() {
    // Deployed ingestion behavior: an unsupported explicit label defaults
    // to BIPAP without consulting the classifier
    assert_eq!(
        resolve_device_type(Some("OXYGEN"), CPAP_FRAME),
        DeviceType::Bipap
    );
    assert_eq!(
        resolve_device_type(Some("cpap"), CPAP_FRAME),
        DeviceType::Bipap
    );
}
