//! Append-only query-performance log
//!
//! Optional sink for API latency and query execution times, written as one
//! growing JSON array so the file stays trivially loadable by downstream
//! analysis scripts. The connector treats this as fire-and-forget; callers
//! deciding they need it append a record per step.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// One performance log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfRecord {
    /// When the record was created
    pub timestamp: DateTime<Utc>,
    /// Name of the pipeline step being measured
    pub step: String,
    /// API latency in seconds, when measuring a fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_seconds: Option<f64>,
    /// Execution time in seconds, when measuring a query step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_seconds: Option<f64>,
    /// Request URL, when the step maps to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PerfRecord {
    /// Record the latency of one API call
    pub fn latency(step: impl Into<String>, latency: Duration, url: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            step: step.into(),
            latency_seconds: Some(latency.as_secs_f64()),
            execution_time_seconds: None,
            url: Some(url.into()),
        }
    }

    /// Record the execution time of one query step
    pub fn execution(step: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            step: step.into(),
            latency_seconds: None,
            execution_time_seconds: Some(elapsed.as_secs_f64()),
            url: None,
        }
    }
}

/// Append-only JSON-array log file
#[derive(Debug, Clone)]
pub struct PerfLog {
    path: PathBuf,
}

impl PerfLog {
    /// Create a log writing to the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one record, creating the file on first write
    ///
    /// The existing file is read back, extended, and rewritten whole. A
    /// corrupted or empty file starts fresh with a warning instead of
    /// blocking the pipeline.
    pub fn append(&self, record: &PerfRecord) -> Result<()> {
        let mut records = self.read_or_fresh();
        records.push(record.clone());

        let serialized = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Read all records currently in the log
    pub fn read_all(&self) -> Result<Vec<PerfRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn read_or_fresh(&self) -> Vec<PerfRecord> {
        match self.read_all() {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "corrupted performance log, starting fresh"
                );
                Vec::new()
            }
        }
    }
}
