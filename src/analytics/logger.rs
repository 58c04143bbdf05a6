use std::fmt;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::profile::GovernanceProfile;

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// Backend operation recorded in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Evaluate,
    Fix,
    Chat,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evaluate => write!(f, "evaluate"),
            Self::Fix => write!(f, "fix"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

/// One line of `~/.dqai/request-log.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub operation: Operation,
    /// Governance profile, for evaluate requests.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile: Option<GovernanceProfile>,
    pub success: bool,
    pub latency_ms: u64,
    /// HTTP status of a failed request that reached the backend.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append one request outcome to the log. Best-effort: I/O failures are
/// ignored so logging never changes the outcome of a request.
pub fn log_request(
    operation: Operation,
    profile: Option<GovernanceProfile>,
    latency_ms: u64,
    error: Option<&BackendError>,
) {
    let entry = RequestLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        operation,
        profile,
        success: error.is_none(),
        latency_ms,
        status: error.and_then(BackendError::status),
        error: error.map(|e| e.to_string()),
    };

    let _ = append_log_entry(&entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read every entry. Malformed lines are skipped; a missing file is empty.
pub fn read_all_entries() -> Vec<RequestLogEntry> {
    let Some(path) = request_log_path() else {
        return Vec::new();
    };

    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Entries from the last `days` days, or all of them for `None`.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<RequestLogEntry> {
    let entries = read_all_entries();

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(entry: &RequestLogEntry) -> Result<()> {
    let Some(path) = request_log_path() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the request log file.
pub fn request_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("request-log.jsonl"))
}
