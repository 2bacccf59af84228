//! Telemetry ingestion service
//!
//! Turns inbound gateway traffic into stored telemetry records: unwraps
//! broker envelopes, resolves device identity and type, decodes the frame,
//! and saves through the record store with bounded retries.
//!
//! ## Architecture
//!
//! - [`payload`] - Gateway payload envelope and validation
//! - [`topic`] - Device-id extraction from MQTT-style topic strings
//! - [`ingestor`] - Ingestion orchestration and the save retry loop

pub mod ingestor;
pub mod payload;
pub mod topic;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use ingestor::Ingestor;
pub use payload::IngestPayload;
pub use topic::device_id_from_topic;
