//! Structured JSONL journal of store mutations.
//!
//! This module provides machine-parseable logging with:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - A session ID for correlating one process run
//! - Structured command and event data in JSON format

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::store::{StoreCommand, StoreEvent};

/// Structured JSONL logger for mutation auditing.
pub struct StructuredLogger {
    session_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number (unique across the session)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    pub session_id: String,
    /// Component that emitted the log
    pub component: String,
    /// Structured event data
    pub event: Value,
}

impl StructuredLogger {
    /// Creates a new structured logger for the given session.
    ///
    /// Logs are appended to `<logs_dir>/events.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The logs directory cannot be created
    /// - The log file cannot be opened
    pub fn new(session_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event.
    ///
    /// The event is serialized to JSON and written as a single line.
    /// Write failures are swallowed; the journal never fails a mutation.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    /// Logs a command received by the store.
    pub fn log_command(&self, command_seq: u64, command: &StoreCommand) {
        self.log(
            "Store",
            serde_json::json!({
                "type": "StoreCommand",
                "command_seq": command_seq,
                "command": command
            }),
        );
    }

    /// Logs an event emitted by a committed command.
    pub fn log_event(&self, command_seq: u64, event: &StoreEvent) {
        self.log(
            "Store",
            serde_json::json!({
                "type": "StoreEvent",
                "command_seq": command_seq,
                "event": event
            }),
        );
    }

    /// Logs where the initial state came from.
    pub fn log_state_loaded(&self, source: &str, deals: usize, proposals: usize) {
        self.log(
            "Persistence",
            serde_json::json!({
                "type": "StateLoaded",
                "source": source,
                "deals": deals,
                "proposals": proposals
            }),
        );
    }

    /// Logs a failed attempt to mirror state to storage.
    pub fn log_persistence_failure(&self, error: &str) {
        self.log(
            "Persistence",
            serde_json::json!({
                "type": "PersistenceFailed",
                "error": error
            }),
        );
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    #[cfg(test)]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
