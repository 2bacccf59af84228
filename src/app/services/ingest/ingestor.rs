//! Ingestion orchestration
//!
//! Resolves device identity and type for each submission, decodes the
//! frame, and persists the resulting record. Storage hiccups are absorbed
//! by a bounded retry loop with linear backoff; frame malformation never
//! fails an ingest.

use chrono::Utc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::app::models::{DataSource, TelemetryRecord};
use crate::app::services::frame_parser::{parse_frame, resolve_device_type};
use crate::app::services::store::TelemetryStore;
use crate::config::ProcessorConfig;
use crate::constants::GENERATED_DEVICE_ID_PREFIX;
use crate::{Error, Result};

use super::payload::IngestPayload;
use super::topic::device_id_from_topic;

/// Telemetry ingestion service
///
/// Generic over the record store so tests and alternative backends plug in
/// through [`TelemetryStore`].
#[derive(Debug)]
pub struct Ingestor<S> {
    store: S,
    config: ProcessorConfig,
}

impl<S: TelemetryStore> Ingestor<S> {
    /// Create a new ingestor over a record store
    pub fn new(store: S, config: ProcessorConfig) -> Self {
        Self { store, config }
    }

    /// The underlying record store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest one gateway submission
    ///
    /// Validates the payload, resolves device id and type, decodes the
    /// frame, and saves the record with retries. Returns the stored record.
    pub async fn ingest(
        &self,
        payload: &IngestPayload,
        source: DataSource,
    ) -> Result<TelemetryRecord> {
        payload.validate()?;

        let raw_data = payload
            .device_data
            .as_deref()
            .ok_or_else(|| Error::data_validation("device_data is required"))?;
        let device_status = payload
            .device_status
            .ok_or_else(|| Error::data_validation("device_status is required"))?;

        let device_type = resolve_device_type(payload.device_type_label(), raw_data);
        let device_id = self.resolve_device_id(payload);

        debug!(
            "Ingesting frame for device {} as {} ({} bytes)",
            device_id,
            device_type,
            raw_data.len()
        );

        let record = TelemetryRecord::new(
            device_type,
            device_id,
            device_status,
            raw_data.to_string(),
            parse_frame(raw_data, device_type),
            source,
        );

        self.save_with_retry(&record).await?;
        Ok(record)
    }

    /// Ingest one bare frame, as read from a capture file
    pub async fn ingest_frame(
        &self,
        raw_data: &str,
        explicit_type: Option<&str>,
        device_id: Option<String>,
        device_status: i64,
        source: DataSource,
    ) -> Result<TelemetryRecord> {
        let device_type = resolve_device_type(explicit_type, raw_data);
        let device_id = device_id.unwrap_or_else(generated_device_id);

        let record = TelemetryRecord::new(
            device_type,
            device_id,
            device_status,
            raw_data.to_string(),
            parse_frame(raw_data, device_type),
            source,
        );

        self.save_with_retry(&record).await?;
        Ok(record)
    }

    /// Device id resolution order: declared id, then topic, then generated
    fn resolve_device_id(&self, payload: &IngestPayload) -> String {
        if let Some(id) = payload.declared_device_id() {
            return id.to_string();
        }

        if let Some(id) = payload
            .topic
            .as_deref()
            .and_then(device_id_from_topic)
        {
            return id;
        }

        generated_device_id()
    }

    /// Save with bounded retries and linear backoff
    async fn save_with_retry(&self, record: &TelemetryRecord) -> Result<()> {
        let max_attempts = self.config.max_save_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.store.save(record).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(
                            "Record for device {} saved on attempt {}/{}",
                            record.device_id, attempt, max_attempts
                        );
                    }
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "Save attempt {}/{} failed for device {}: {}",
                        attempt, max_attempts, record.device_id, e
                    );
                    last_error = e.to_string();

                    if attempt < max_attempts {
                        sleep(Duration::from_millis(
                            self.config.save_retry_delay_ms * attempt as u64,
                        ))
                        .await;
                    }
                }
            }
        }

        Err(Error::store_exhausted(max_attempts, last_error))
    }
}

/// Fallback device id for submissions carrying no identity at all
fn generated_device_id() -> String {
    format!(
        "{}{}",
        GENERATED_DEVICE_ID_PREFIX,
        Utc::now().timestamp_millis()
    )
}
