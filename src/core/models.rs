use std::fmt;
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Timestamp layout written to the audit log (local wall-clock time).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Accepts both microsecond and whole-second timestamps.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// "<timestamp> | SRC: <source> | DEST: <destination> | PORT: <port> | STATUS: <status>"
static RECORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ts>[^|]+?) \| SRC: (?P<src>.*) \| DEST: (?P<dest>.*?) \| PORT: (?P<port>\d+) \| STATUS: (?P<status>[A-Z]+)$",
    )
    .expect("audit record regex is valid")
});

/// Outcome classification stored with every audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    /// The transfer tool exited zero.
    Success,
    /// The transfer tool ran and exited non-zero.
    Failed,
    /// The transfer tool could not be launched at all.
    Error,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = RecordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "ERROR" => Ok(Self::Error),
            other => Err(RecordParseError::UnknownStatus(other.to_string())),
        }
    }
}

/// Why an audit log line could not be turned back into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("line does not match the audit record layout")]
    Layout,

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error("invalid port: {0}")]
    Port(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// One immutable entry of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub timestamp: NaiveDateTime,
    pub source: String,
    pub destination: String,
    pub port: NonZeroU16,
    pub status: TransferStatus,
}

impl TransferRecord {
    /// Build a record stamped with the current local time.
    pub fn now(request: &TransferRequest, status: TransferStatus) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            source: request.source.clone(),
            destination: request.destination.clone(),
            port: request.port,
            status,
        }
    }
}

/// Serializes to the single-line on-disk form, without a trailing newline.
///
/// Line breaks inside caller-supplied fields are flattened to spaces so a
/// record can never span more than one line.
impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | SRC: {} | DEST: {} | PORT: {} | STATUS: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            single_line(&self.source),
            single_line(&self.destination),
            self.port,
            self.status
        )
    }
}

impl FromStr for TransferRecord {
    type Err = RecordParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let caps = RECORD_RE
            .captures(line.trim_end_matches(['\r', '\n']))
            .ok_or(RecordParseError::Layout)?;

        let ts = &caps["ts"];
        let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_PARSE_FORMAT)
            .map_err(|_| RecordParseError::Timestamp(ts.to_string()))?;

        let port_str = &caps["port"];
        let port = port_str
            .parse::<NonZeroU16>()
            .map_err(|_| RecordParseError::Port(port_str.to_string()))?;

        Ok(Self {
            timestamp,
            source: caps["src"].to_string(),
            destination: caps["dest"].trim().to_string(),
            port,
            status: caps["status"].parse()?,
        })
    }
}

fn single_line(field: &str) -> String {
    field.replace(['\r', '\n'], " ")
}

/// A transfer as requested by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: String,
    pub destination: String,
    pub port: NonZeroU16,
}

impl TransferRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, port: NonZeroU16) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            port,
        }
    }
}

/// Result handed back across the orchestration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub success: bool,
    pub message: String,
}

impl TransferOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

/// A single child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// A directory listing plus the navigation metadata a browser needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub current_path: PathBuf,
    /// `None` once the listing sits at the sandbox root.
    pub parent_path: Option<PathBuf>,
    pub items: Vec<DirectoryEntry>,
}
