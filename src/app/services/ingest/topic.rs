//! Device-id extraction from broker topic strings
//!
//! Deployed gateways publish on two topic conventions:
//! `devices/{device_id}/data` and the legacy ESP32 firmware's
//! `esp32/data{N}` / `esp32/{id}`. Both are supported verbatim.

use crate::constants::{TOPIC_DATA_SEGMENT_PREFIX, TOPIC_PREFIX_DEVICES, TOPIC_PREFIX_ESP32};

/// Extract a device id from a topic string, if the topic matches a known
/// convention
pub fn device_id_from_topic(topic: &str) -> Option<String> {
    let segments: Vec<&str> = topic.split('/').collect();
    if segments.len() < 2 {
        return None;
    }

    match segments[0] {
        TOPIC_PREFIX_DEVICES => {
            // devices/{device_id}/data
            let id = segments[1];
            (!id.is_empty()).then(|| id.to_string())
        }
        TOPIC_PREFIX_ESP32 => {
            // esp32/data24 -> 24, esp32/24 -> 24
            let segment = segments[1];
            let id = segment.replacen(TOPIC_DATA_SEGMENT_PREFIX, "", 1);
            if !id.is_empty() {
                Some(id)
            } else if !segment.is_empty() {
                Some(segment.to_string())
            } else {
                Some(TOPIC_PREFIX_ESP32.to_string())
            }
        }
        _ => None,
    }
}
