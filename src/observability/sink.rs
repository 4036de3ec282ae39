//! Output destinations for rendered records.
//!
//! # Design Decisions
//! - One `write` call per record, carrying the complete line
//! - Sinks are shared by a logger and all of its children
//! - Write failures are swallowed; the sink is assumed writable

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::Level;

use super::level::LogLevel;
use super::record::Record;

/// Destination for rendered log lines.
pub trait Sink: Send + Sync {
    /// Write one rendered record. `line` carries no trailing newline.
    fn write(&self, record: &Record, line: &str);
}

/// Standard output, one line per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write(&self, _record: &Record, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl Sink for DiscardSink {
    fn write(&self, _record: &Record, _line: &str) {}
}

/// Keeps lines in memory. Used by tests and embedders that inspect output.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("memory sink mutex poisoned").clone()
    }

    /// Captured lines parsed as JSON. Lines that are not JSON are skipped.
    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Captured records whose `msg` equals `msg`.
    pub fn records_with_msg(&self, msg: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r.get("msg").and_then(Value::as_str) == Some(msg))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().expect("memory sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lines.lock().expect("memory sink mutex poisoned").clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, _record: &Record, line: &str) {
        self.lines
            .lock()
            .expect("memory sink mutex poisoned")
            .push(line.to_string());
    }
}

/// Re-emits records as `tracing` events for hosts that already run a subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn write(&self, record: &Record, line: &str) {
        let msg = record.msg().unwrap_or_default();
        let fatal = record.level == LogLevel::Fatal;
        match record.level.to_tracing() {
            Level::TRACE => tracing::trace!(target: "reqlog", record = %line, "{msg}"),
            Level::DEBUG => tracing::debug!(target: "reqlog", record = %line, "{msg}"),
            Level::INFO => tracing::info!(target: "reqlog", record = %line, "{msg}"),
            Level::WARN => tracing::warn!(target: "reqlog", record = %line, "{msg}"),
            _ => tracing::error!(target: "reqlog", record = %line, fatal, "{msg}"),
        }
    }
}
