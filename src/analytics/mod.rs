//! Event log and debug output.
//!
//! Backend calls are appended to `~/.primedash/events.jsonl`. Debug lines
//! (swallowed failures, discarded stale responses) go to
//! `~/.primedash/client.log` and, with `logging.debug`, to stderr as well.
//! Nothing here may fail a dashboard operation.

pub mod logger;
pub mod reporter;

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Utc;
use colored::Colorize;

use crate::config::schema::LoggingConfig;

#[derive(Debug, Clone, Copy)]
pub struct LogPrefs {
    pub enabled: bool,
    pub debug: bool,
}

static LOG_PREFS: OnceLock<LogPrefs> = OnceLock::new();

/// Install logging preferences. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let _ = LOG_PREFS.set(LogPrefs {
        enabled: config.enabled,
        debug: config.debug,
    });
}

/// Current preferences; everything is off until [`init`] runs.
pub fn prefs() -> LogPrefs {
    *LOG_PREFS.get().unwrap_or(&LogPrefs {
        enabled: false,
        debug: false,
    })
}

/// Record a debug line.
pub fn debug(message: &str) {
    let prefs = prefs();
    if prefs.debug {
        eprintln!("{} {}", "[primedash]".dimmed(), message.dimmed());
    }
    if !prefs.enabled {
        return;
    }

    let Some(path) = client_log_path() else {
        return;
    };
    if let Some(parent) = path.parent()
        && create_dir_all(parent).is_err()
    {
        return;
    }
    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{} {}", Utc::now().to_rfc3339(), message);
}

fn client_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("client.log"))
}
