use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

// ---------------------------------------------------------------------------
// Call log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the event log (`~/.primedash/events.jsonl`).
///
/// One entry per backend call. Read back by `primedash history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub timestamp: String,
    /// Operation name, e.g. `"me"`, `"settings.save"`, `"ai.plan"`.
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guild_id: Option<String>,
    /// `"ok"`, `"transport"`, `"unauthorized"`, `"http"` or `"application"`.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub latency_ms: u64,
}

impl CallLogEntry {
    pub fn is_ok(&self) -> bool {
        self.outcome == "ok"
    }
}

/// Short outcome label for an API result.
pub fn outcome_label(error: Option<&ApiError>) -> &'static str {
    match error {
        None => "ok",
        Some(ApiError::Transport(_)) => "transport",
        Some(ApiError::Unauthorized) => "unauthorized",
        Some(ApiError::Http(_)) => "http",
        Some(ApiError::Application(_)) => "application",
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Record one backend call. Best-effort; a no-op when logging is disabled.
pub fn log_call(
    operation: &str,
    guild_id: Option<&str>,
    status: Option<u16>,
    latency_ms: u64,
    error: Option<&ApiError>,
) {
    if !super::prefs().enabled {
        return;
    }

    let entry = CallLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        operation: operation.to_string(),
        guild_id: guild_id.map(str::to_string),
        outcome: outcome_label(error).to_string(),
        status,
        latency_ms,
    };

    let _ = append_log_entry(&entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from `~/.primedash/events.jsonl`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries() -> Vec<CallLogEntry> {
    let Some(path) = events_log_path() else {
        return Vec::new();
    };

    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    parse_entries(BufReader::new(file))
}

fn parse_entries(reader: impl BufRead) -> Vec<CallLogEntry> {
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<CallLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last N days (all entries if `days` is `None`).
pub fn read_entries_since_days(days: Option<u32>) -> Vec<CallLogEntry> {
    filter_since_days(read_all_entries(), days)
}

fn filter_since_days(entries: Vec<CallLogEntry>, days: Option<u32>) -> Vec<CallLogEntry> {
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

fn append_log_entry(entry: &CallLogEntry) -> Result<()> {
    let Some(path) = events_log_path() else {
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

/// Return the path to the event log file.
pub fn events_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("events.jsonl"))
}
