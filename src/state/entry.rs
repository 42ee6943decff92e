//! State entries and their on-disk line format.
//!
//! Each line of the state file is one JSON record:
//!
//! ```text
//! {"key":"db/migrate.sh","status":"success","timestamp":"2026-01-01T00:00:00Z"}
//! ```
//!
//! The older `key=status:timestamp` form (timestamp in RFC 3339 or Unix
//! seconds) is still accepted on read.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Recorded outcome of the latest attempt of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    Success,
    Failed,
}

impl FromStr for ScriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" | "succeeded" | "ok" => Ok(Self::Success),
            "failed" | "failure" | "error" => Ok(Self::Failed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Latest recorded state for one script key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEntry {
    pub status: ScriptStatus,
    pub timestamp: DateTime<Utc>,
}

impl StateEntry {
    pub fn now(status: ScriptStatus) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ScriptStatus::Success
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    key: String,
    status: ScriptStatus,
    timestamp: DateTime<Utc>,
}

/// Parse one line of the state file.
///
/// Returns `Ok(None)` for blank lines and `Err` with a reason for lines
/// that cannot be understood.
pub fn parse_line(line: &str) -> Result<Option<(String, StateEntry)>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line.starts_with('{') {
        let record: StateRecord = serde_json::from_str(line).map_err(|e| e.to_string())?;
        return Ok(Some((
            record.key,
            StateEntry {
                status: record.status,
                timestamp: record.timestamp,
            },
        )));
    }

    parse_legacy_line(line).map(Some)
}

fn parse_legacy_line(line: &str) -> Result<(String, StateEntry), String> {
    let (key, rest) = line
        .rsplit_once('=')
        .ok_or_else(|| "expected key=status:timestamp".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("empty key".to_string());
    }

    let (status, timestamp) = match rest.split_once(':') {
        Some((status, timestamp)) => (status, Some(timestamp)),
        None => (rest, None),
    };

    let status: ScriptStatus = status.parse()?;
    let timestamp = match timestamp {
        Some(ts) => parse_timestamp(ts)?,
        None => return Err("missing timestamp".to_string()),
    };

    Ok((key.to_string(), StateEntry { status, timestamp }))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().map_err(|_| format!("bad timestamp: {}", raw))?;
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {}", raw));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", raw, e))
}

/// Serialize one entry as a JSON line (without trailing newline).
pub fn format_line(key: &str, entry: &StateEntry) -> String {
    let record = StateRecord {
        key: key.to_string(),
        status: entry.status,
        timestamp: entry.timestamp,
    };
    // A struct of strings and a timestamp always serializes.
    serde_json::to_string(&record).unwrap_or_default()
}
