use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{AttemptRecord, Period, UsageScope, UsageSink, UsageSummary, summarize_records};
use crate::Result;

/// In-memory, append-only attempt log.
///
/// Reference implementation of the telemetry seam; production deployments
/// back the same trait with the relational store.
#[derive(Debug, Default)]
pub struct MemoryUsageLog {
    records: Mutex<Vec<AttemptRecord>>,
}

impl MemoryUsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UsageSink for MemoryUsageLog {
    async fn record(&self, record: AttemptRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
        Ok(())
    }

    async fn summarize(&self, period: Period, scope: &UsageScope) -> Result<UsageSummary> {
        let records = self.records();
        Ok(summarize_records(&records, period, scope, Utc::now()))
    }
}
