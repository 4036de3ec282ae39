//! Record formatting.
//!
//! # Formats
//! - `Json`: one JSON object per line, for machine parsing
//! - `Pretty`: one colourised human-readable line per record
//!
//! ```text
//! [10:00:00.123] INFO (web/4242 on box): Incoming request method=GET url=/api/users
//! ```

use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::level::LogLevel;
use super::record::Record;

/// Base fields folded into the pretty-line header instead of the tail.
const HEADER_KEYS: [&str; 6] = ["msg", "pid", "hostname", "service", "version", "env"];

/// Output mode of a logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Turns records into single output lines (without the trailing newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    format: LogFormat,
    ansi: bool,
}

impl Formatter {
    pub fn new(format: LogFormat) -> Self {
        Self { format, ansi: true }
    }

    /// Disable ANSI colours in pretty output.
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn render(&self, record: &Record) -> String {
        match self.format {
            LogFormat::Json => render_json(record),
            LogFormat::Pretty => render_pretty(record, self.ansi),
        }
    }
}

fn render_json(record: &Record) -> String {
    record.to_value().to_string()
}

fn render_pretty(record: &Record, ansi: bool) -> String {
    let time = record.time.format("%H:%M:%S%.3f").to_string();
    let label = format!("{:<5}", record.level.as_str().to_uppercase());
    let label = if ansi {
        label.color(level_color(record.level)).bold().to_string()
    } else {
        label
    };

    let mut line = format!("[{time}] {label}");

    let field = |key: &str| record.fields.get(key).map(display_value);
    match (field("service"), field("pid"), field("hostname")) {
        (Some(service), Some(pid), Some(host)) => {
            line.push_str(&format!(" ({service}/{pid} on {host})"));
        }
        (Some(service), _, _) => line.push_str(&format!(" ({service})")),
        _ => {}
    }

    line.push(':');
    if let Some(msg) = record.msg() {
        line.push(' ');
        if ansi {
            line.push_str(&msg.cyan().to_string());
        } else {
            line.push_str(msg);
        }
    }

    for (key, value) in &record.fields {
        if HEADER_KEYS.contains(&key.as_str()) {
            continue;
        }
        let key = if ansi { key.dimmed().to_string() } else { key.clone() };
        line.push_str(&format!(" {key}={}", display_value(value)));
    }
    line
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Trace => Color::BrightBlack,
        LogLevel::Debug => Color::Blue,
        LogLevel::Info => Color::Green,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
        LogLevel::Fatal => Color::BrightRed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::record::fields;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record() -> Record {
        Record {
            level: LogLevel::Info,
            time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            fields: fields(json!({
                "pid": 4242,
                "hostname": "box",
                "service": "web",
                "msg": "Incoming request",
                "method": "GET",
                "query": { "page": 2 },
            })),
        }
    }

    #[test]
    fn test_json_is_single_line_object() {
        let line = Formatter::new(LogFormat::Json).render(&record());
        assert!(!line.contains('\n'));
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["time"], "2024-01-15T10:00:00.000Z");
        assert_eq!(parsed["method"], "GET");
    }

    #[test]
    fn test_pretty_line_without_ansi() {
        let line = Formatter::new(LogFormat::Pretty).without_ansi().render(&record());
        assert_eq!(
            line,
            r#"[10:00:00.000] INFO  (web/4242 on box): Incoming request method=GET query={"page":2}"#
        );
    }
}
