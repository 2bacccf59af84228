//! Gateway payload envelope
//!
//! Inbound traffic arrives as JSON in slightly different shapes depending on
//! the path it took: direct submissions carry the fields at the top level,
//! while broker rule actions wrap the real payload in a nested `payload`
//! member, sometimes as an escaped JSON string. This module normalizes all
//! of them into one validated structure.

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// One inbound telemetry submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestPayload {
    /// Device status code; required, zero is a legal value
    pub device_status: Option<i64>,

    /// Raw telemetry frame; required
    pub device_data: Option<String>,

    /// Declared device type label; auto-detected from the frame when absent
    pub device_type: Option<String>,

    /// Declared device id; recovered from the topic when absent
    pub device_id: Option<String>,

    /// Broker topic the submission arrived on
    pub topic: Option<String>,

    /// Broker message id, used for acknowledgments upstream
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

impl IngestPayload {
    /// Parse a payload from JSON, unwrapping a nested broker envelope
    ///
    /// A top-level `payload` member takes precedence over the outer object;
    /// when it is a string it is parsed as embedded JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        let outer: Value = serde_json::from_str(input)
            .map_err(|e| Error::serialization("Failed to parse ingest payload", e))?;

        let value = match outer.get("payload") {
            Some(Value::String(embedded)) => serde_json::from_str(embedded)
                .map_err(|e| Error::serialization("Failed to parse embedded payload", e))?,
            Some(nested) => nested.clone(),
            None => outer,
        };

        serde_json::from_value(value)
            .map_err(|e| Error::serialization("Unexpected ingest payload shape", e))
    }

    /// Check the required fields are present
    pub fn validate(&self) -> Result<()> {
        if self.device_status.is_none() {
            return Err(Error::data_validation("device_status is required"));
        }

        match self.device_data.as_deref() {
            None | Some("") => Err(Error::data_validation("device_data is required")),
            Some(_) => Ok(()),
        }
    }

    /// Declared device type label, with empty strings treated as absent
    pub fn device_type_label(&self) -> Option<&str> {
        self.device_type.as_deref().filter(|label| !label.is_empty())
    }

    /// Declared device id, with empty strings treated as absent
    pub fn declared_device_id(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|id| !id.is_empty())
    }
}
