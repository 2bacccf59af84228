//! Record store collaborator interface
//!
//! The ingestion pipeline hands finished [`TelemetryRecord`]s to a
//! [`TelemetryStore`]. Persistence backends beyond the bundled NDJSON sink
//! (document stores, object storage) live outside this crate; they plug in
//! through the same trait.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::app::models::TelemetryRecord;
use crate::{Error, Result};

/// Sink for ingested telemetry records
pub trait TelemetryStore {
    /// Persist one record. Failures are retried by the caller.
    fn save(
        &self,
        record: &TelemetryRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Append-only newline-delimited JSON record sink
///
/// One JSON-encoded record per line, flushed per save so a crashed run
/// keeps everything already acknowledged.
#[derive(Debug)]
pub struct NdjsonStore {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl NdjsonStore {
    /// Open a sink at `path`, creating the file if needed and appending to
    /// existing content
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(format!("Failed to open record sink {}", path.display()), e))?;

        debug!("Opened NDJSON record sink: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetryStore for NdjsonStore {
    async fn save(&self, record: &TelemetryRecord) -> Result<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| Error::serialization("Failed to encode telemetry record", e))?;

        let mut writer = self.writer.lock().await;
        writeln!(writer, "{}", line)
            .map_err(|e| Error::io(format!("Failed to append to {}", self.path.display()), e))?;
        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to flush {}", self.path.display()), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{DataSource, DeviceType, ParsedRecord};
    use crate::app::services::frame_parser::parse_frame;

    fn sample_record(device_id: &str) -> TelemetryRecord {
        let raw = "*,S,141125,1447,G,12.2,1.0,#";
        TelemetryRecord::new(
            DeviceType::Cpap,
            device_id.to_string(),
            1,
            raw.to_string(),
            parse_frame(raw, DeviceType::Cpap),
            DataSource::Direct,
        )
    }

    #[tokio::test]
    async fn test_ndjson_store_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");

        let store = NdjsonStore::create(&path).unwrap();
        store.save(&sample_record("dev-1")).await.unwrap();
        store.save(&sample_record("dev-2")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TelemetryRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.device_id, "dev-1");
        assert_eq!(first.device_type, DeviceType::Cpap);
        assert_ne!(first.parsed_data, ParsedRecord::default());
    }

    #[tokio::test]
    async fn test_ndjson_store_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");

        {
            let store = NdjsonStore::create(&path).unwrap();
            store.save(&sample_record("dev-1")).await.unwrap();
        }
        {
            let store = NdjsonStore::create(&path).unwrap();
            store.save(&sample_record("dev-2")).await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
