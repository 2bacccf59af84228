//! Ventilator Telemetry Processor Library
//!
//! A Rust library for decoding compact comma-delimited telemetry frames
//! emitted by CPAP and BIPAP ventilator firmware into structured records.
//!
//! This library provides tools for:
//! - Splitting raw ASCII frames into single-letter sections with mixed
//!   numeric/string tokens
//! - Mapping positional section data to named field groups per device type
//! - Auto-detecting the device type of unlabeled frames
//! - Assembling ingestion records with device identity and provenance
//! - Writing records to an append-only NDJSON sink with bounded retries

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod frame_parser;
        pub mod ingest;
        pub mod store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{DeviceType, ParsedRecord, SectionMap, TelemetryRecord, TokenValue};
pub use app::services::frame_parser::{classify, parse_device_data, parse_frame};
pub use config::ProcessorConfig;

/// Result type alias for the telemetry processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for telemetry processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Device type outside the supported vocabulary
    ///
    /// The only failure the frame parser itself can produce. Malformed frame
    /// content never errors; it degrades to null fields or string tokens.
    #[error("Unknown device type: {device_type}")]
    UnknownDeviceType { device_type: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error (payload fields, frame accounting)
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Record store rejected a save
    #[error("Store error: {message}")]
    Store { message: String },

    /// Record store stayed unavailable through every retry
    #[error("Store exhausted after {attempts} attempts: {message}")]
    StoreExhausted { attempts: usize, message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an unknown device type error
    pub fn unknown_device_type(device_type: impl Into<String>) -> Self {
        Self::UnknownDeviceType {
            device_type: device_type.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a store exhausted error
    pub fn store_exhausted(attempts: usize, message: impl Into<String>) -> Self {
        Self::StoreExhausted {
            attempts,
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}
