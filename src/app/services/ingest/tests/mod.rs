//! Test utilities and mock infrastructure for ingestion testing

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app::models::TelemetryRecord;
use crate::app::services::store::TelemetryStore;
use crate::{Error, Result};


/// In-memory store that fails a configured number of saves before
/// accepting, for exercising the retry loop
#[derive(Debug, Default)]
pub struct FlakyStore {
    records: Mutex<Vec<TelemetryRecord>>,
    failures_remaining: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyStore {
    /// A store that accepts every save
    pub fn reliable() -> Self {
        Self::default()
    }

    /// A store that rejects the first `failures` saves
    pub fn failing(failures: usize) -> Self {
        let store = Self::default();
        store.failures_remaining.store(failures, Ordering::SeqCst);
        store
    }

    /// Total save attempts observed
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Records accepted so far
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl TelemetryStore for FlakyStore {
    async fn save(&self, record: &TelemetryRecord) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::store("simulated store outage"));
        }

        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}
