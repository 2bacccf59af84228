//! Configuration management and validation
//!
//! Provides processing parameters for the ingestion pipeline with a layered
//! loading scheme: built-in defaults, then an optional JSON config file,
//! then CLI overrides applied by the command layer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::models::DataSource;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_PARALLEL_WORKERS, FRAME_FILE_PATTERN,
    MAX_SAVE_ATTEMPTS, SAVE_RETRY_DELAY_MS,
};
use crate::{Error, Result};

/// Global configuration for telemetry processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Number of capture files processed concurrently
    pub workers: usize,

    /// Glob pattern for capture files in an input directory
    pub frame_file_pattern: String,

    /// Provenance stamped onto ingested records
    pub data_source: DataSource,

    /// Maximum save attempts per record before giving up
    pub max_save_attempts: usize,

    /// Linear backoff unit between save attempts, in milliseconds
    pub save_retry_delay_ms: u64,

    /// Input path override from the config file
    pub input_path: Option<PathBuf>,

    /// Output path override from the config file
    pub output_path: Option<PathBuf>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_PARALLEL_WORKERS,
            frame_file_pattern: FRAME_FILE_PATTERN.to_string(),
            data_source: DataSource::default(),
            max_save_attempts: MAX_SAVE_ATTEMPTS,
            save_retry_delay_ms: SAVE_RETRY_DELAY_MS,
            input_path: None,
            output_path: None,
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Create configuration with a custom capture file pattern
    pub fn with_frame_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.frame_file_pattern = pattern.into();
        self
    }

    /// Create configuration with a custom record provenance
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

    /// Create configuration with a custom save retry policy
    pub fn with_save_retry(mut self, max_attempts: usize, delay_ms: u64) -> Self {
        self.max_save_attempts = max_attempts;
        self.save_retry_delay_ms = delay_ms;
        self
    }

    /// Worker count clamped to the machine's core count
    pub fn effective_workers(&self) -> usize {
        self.workers.min(num_cpus::get().max(1))
    }

    /// Default config file location under the user config directory
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file {}", path.display()), e))?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::serialization(format!("Invalid config file {}", path.display()), e)
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Layered load: defaults, then the config file (when present), then
    /// explicit path overrides
    pub fn load_layered(
        input_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        if input_path.is_some() {
            config.input_path = input_path;
        }
        if output_path.is_some() {
            config.output_path = output_path;
        }

        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.workers > 100 {
            return Err(Error::configuration("Number of workers cannot exceed 100"));
        }

        if self.max_save_attempts == 0 {
            return Err(Error::configuration(
                "Save attempts must be greater than 0",
            ));
        }

        if self.frame_file_pattern.is_empty() {
            return Err(Error::configuration(
                "Capture file pattern cannot be empty",
            ));
        }

        Ok(())
    }
}
