//! Integration tests for the ingestion pipeline and NDJSON record sink
//!
//! Drives gateway payloads through the full ingest path and verifies the
//! persisted record shape downstream consumers read back.

use anyhow::Result;
use tempfile::tempdir;

use vent_processor::app::models::DataSource;
use vent_processor::app::services::ingest::{IngestPayload, Ingestor};
use vent_processor::app::services::store::NdjsonStore;
use vent_processor::{DeviceType, ProcessorConfig, TelemetryRecord};

const CPAP_FRAME: &str =
    "*,S,141125,1447,G,12.2,1.0,H,10.6,10.6,20.0,1.0,I,5.0,1.0,1.0,1.0,0.0,1.0,1.0,#";

fn test_config() -> ProcessorConfig {
    ProcessorConfig::default().with_save_retry(3, 0)
}

#[tokio::test]
async fn test_payload_to_ndjson_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let sink_path = dir.path().join("records.ndjson");

    let store = NdjsonStore::create(&sink_path)?;
    let ingestor = Ingestor::new(store, test_config());

    let payload = IngestPayload::from_json(&format!(
        r#"{{
            "device_status": 1,
            "device_data": "{}",
            "topic": "esp32/data24"
        }}"#,
        CPAP_FRAME
    ))?;

    let ingested = ingestor.ingest(&payload, DataSource::Cloud).await?;
    assert_eq!(ingested.device_id, "24");
    assert_eq!(ingested.device_type, DeviceType::Cpap);

    // Read the sink back and compare
    let content = std::fs::read_to_string(&sink_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let stored: TelemetryRecord = serde_json::from_str(lines[0])?;
    assert_eq!(stored, ingested);
    assert_eq!(stored.raw_data, CPAP_FRAME);
    assert_eq!(stored.data_source, DataSource::Cloud);

    Ok(())
}

#[tokio::test]
async fn test_persisted_json_shape() -> Result<()> {
    let dir = tempdir()?;
    let sink_path = dir.path().join("records.ndjson");

    let store = NdjsonStore::create(&sink_path)?;
    let ingestor = Ingestor::new(store, test_config());

    // A truncated frame: decoding degrades, the ingest still succeeds
    ingestor
        .ingest_frame(
            "*,S,141125,#",
            Some("CPAP"),
            Some("vent-07".to_string()),
            0,
            DataSource::Direct,
        )
        .await?;

    let content = std::fs::read_to_string(&sink_path)?;
    let json: serde_json::Value = serde_json::from_str(content.lines().next().unwrap())?;

    assert_eq!(json["device_type"], serde_json::json!("CPAP"));
    assert_eq!(json["device_id"], serde_json::json!("vent-07"));
    assert_eq!(json["device_status"], serde_json::json!(0));
    assert_eq!(json["data_source"], serde_json::json!("direct"));
    assert_eq!(json["raw_data"], serde_json::json!("*,S,141125,#"));
    assert!(json["timestamp"].is_string());

    // Parsed data keeps the deployed shape: sections object, null for the
    // missing field, absent groups omitted
    assert_eq!(
        json["parsed_data"]["sections"]["S"][0],
        serde_json::json!(141125.0)
    );
    assert_eq!(json["parsed_data"]["metadata"]["date"], serde_json::json!(141125.0));
    assert!(json["parsed_data"]["metadata"]["time"].is_null());
    assert!(
        !json["parsed_data"]
            .as_object()
            .unwrap()
            .contains_key("settings")
    );

    Ok(())
}

#[tokio::test]
async fn test_mixed_batch_appends_in_order() -> Result<()> {
    let dir = tempdir()?;
    let sink_path = dir.path().join("records.ndjson");

    let store = NdjsonStore::create(&sink_path)?;
    let ingestor = Ingestor::new(store, test_config());

    ingestor
        .ingest_frame(CPAP_FRAME, None, Some("a".to_string()), 1, DataSource::Software)
        .await?;
    ingestor
        .ingest_frame(
            "*,S,1,2,A,1,2,B,1,2,C,1,D,1,E,1,F,1,#",
            None,
            Some("b".to_string()),
            1,
            DataSource::Software,
        )
        .await?;

    let content = std::fs::read_to_string(&sink_path)?;
    let records: Vec<TelemetryRecord> = content
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].device_id, "a");
    assert_eq!(records[0].device_type, DeviceType::Cpap);
    assert_eq!(records[1].device_id, "b");
    // Seven lettered sections push the classifier past its threshold
    assert_eq!(records[1].device_type, DeviceType::Bipap);

    Ok(())
}
