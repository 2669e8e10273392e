use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Position;

/// Candidate turned away by the whitelist, kept for later review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub recorded_at: DateTime<Utc>,
    pub position: Position,
    pub alliance: String,
    pub raw_text: String,
}

/// Destination for rejection records.
pub trait AuditSink: Send + Sync {
    fn record_rejection(&self, candidate: RejectedCandidate) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to open audit log {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write audit record: {0}")]
    Write(#[from] csv::Error),
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Appends rejections to a CSV file, writing the header when the file is new.
#[derive(Debug, Clone)]
pub struct CsvAuditSink {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvAuditSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for CsvAuditSink {
    fn record_rejection(&self, candidate: RejectedCandidate) -> Result<(), AuditError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AuditError::Unavailable("audit log lock poisoned".to_string()))?;

        let is_new = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(&candidate)?;
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Rejections kept by a [`MemoryAuditSink`] unless another limit is given.
pub const DEFAULT_MEMORY_AUDIT_LIMIT: usize = 1_000;

/// Keeps the most recent rejections in memory; used by simulations and tests.
#[derive(Debug, Clone)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<VecDeque<RejectedCandidate>>>,
    limit: usize,
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MEMORY_AUDIT_LIMIT)
    }
}

impl MemoryAuditSink {
    /// Sink holding at most `limit` records, dropping the oldest first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            limit: limit.max(1),
        }
    }

    pub fn records(&self) -> Vec<RejectedCandidate> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record_rejection(&self, candidate: RejectedCandidate) -> Result<(), AuditError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AuditError::Unavailable("audit buffer poisoned".to_string()))?;
        if records.len() >= self.limit {
            records.pop_front();
        }
        records.push_back(candidate);
        Ok(())
    }
}
