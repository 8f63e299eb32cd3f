//! Append-only audit trail of transfer attempts.
//!
//! One record per line in a plain text file. All reads and writes go through
//! a single in-process lock so readers only ever see whole lines.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::TransferRecord;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to write audit log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read audit log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line write.
    pub async fn append(&self, record: &TransferRecord) -> Result<(), AuditError> {
        let mut line = record.to_string();
        line.push('\n');

        let _guard = self.lock.lock().await;

        let write_err = |source| AuditError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_err)?;
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        debug!(path = %self.path.display(), status = %record.status, "Audit record appended");
        Ok(())
    }

    /// Up to the last `n` raw lines, oldest first. Empty if the log does not exist.
    pub async fn tail(&self, n: usize) -> Result<Vec<String>, AuditError> {
        let lines = self.read_lines().await?;
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].to_vec())
    }

    /// Destination of the most recent well-formed record, skipping malformed lines.
    pub async fn last_destination(&self) -> Result<Option<String>, AuditError> {
        let lines = self.read_lines().await?;

        Ok(lines
            .iter()
            .rev()
            .filter_map(|line| line.parse::<TransferRecord>().ok())
            .map(|record| record.destination)
            .next())
    }

    async fn read_lines(&self) -> Result<Vec<String>, AuditError> {
        let _guard = self.lock.lock().await;

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuditError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect())
    }
}
