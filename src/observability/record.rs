//! Log records and the entries callers hand to a logger.
//!
//! # Data Flow
//! ```text
//! Entry { fields, msg }            (caller)
//!     → merged over logger base fields
//!     → unset values stripped
//!     → redaction (production only)
//!     → Record { level, time, fields }
//!     → format.rs → sink.rs
//! ```
//!
//! `level` and `time` are owned by the record; caller fields with those
//! names are ignored.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::level::LogLevel;

/// Arbitrary structured fields attached to a record.
pub type Fields = Map<String, Value>;

/// Keys the record reserves for itself.
pub const RESERVED_KEYS: [&str; 2] = ["level", "time"];

/// Build a field map from a JSON value.
///
/// Objects are used as-is; any other value is stored under `value`.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        Value::Null => Fields::new(),
        other => {
            let mut map = Fields::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// What a caller asks to log: a field map and an optional message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub fields: Fields,
    pub msg: Option<String>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry carrying only a message.
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            fields: Fields::new(),
            msg: Some(msg.into()),
        }
    }

    /// Add one field. `None`-like values are kept here and stripped at emission.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merge a field map; incoming keys win.
    pub fn with_fields(mut self, extra: Fields) -> Self {
        self.fields.extend(extra);
        self
    }

    /// Set the human-readable summary.
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }
}

impl From<&str> for Entry {
    fn from(msg: &str) -> Self {
        Entry::message(msg)
    }
}

impl From<String> for Entry {
    fn from(msg: String) -> Self {
        Entry::message(msg)
    }
}

impl From<Fields> for Entry {
    fn from(fields: Fields) -> Self {
        Self { fields, msg: None }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::from(fields(value))
    }
}

/// A fully assembled record, ready for formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: LogLevel,
    pub time: DateTime<Utc>,
    pub fields: Fields,
}

impl Record {
    /// The `msg` field, if any.
    pub fn msg(&self) -> Option<&str> {
        self.fields.get("msg").and_then(Value::as_str)
    }

    /// ISO-8601 timestamp with millisecond precision.
    pub fn time_rfc3339(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The record as one JSON object: `level`, `time`, then the fields.
    pub fn to_value(&self) -> Value {
        let mut map = Fields::new();
        map.insert("level".to_string(), Value::from(self.level.as_str()));
        map.insert("time".to_string(), Value::from(self.time_rfc3339()));
        for (key, value) in &self.fields {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                map.insert(key.clone(), value.clone());
            }
        }
        Value::Object(map)
    }

    /// Parse a rendered JSON record back. `None` unless `level` and `time`
    /// are present and valid.
    pub fn from_value(value: Value) -> Option<Record> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let level = map.remove("level")?.as_str()?.parse().ok()?;
        let time = DateTime::parse_from_rfc3339(map.remove("time")?.as_str()?)
            .ok()?
            .with_timezone(&Utc);
        Some(Record {
            level,
            time,
            fields: map,
        })
    }
}

/// Remove unset (`null`) values from every object, at any depth.
///
/// Array elements are kept in place so positions stay meaningful; objects
/// nested inside arrays are still cleaned.
pub fn strip_unset(fields: &mut Fields) {
    fields.retain(|_, value| !value.is_null());
    for value in fields.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Object(map) => strip_unset(map),
        Value::Array(items) => items.iter_mut().for_each(strip_value),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_unset_recurses_into_objects() {
        let mut map = fields(json!({
            "a": null,
            "b": 1,
            "nested": { "c": null, "d": "x" },
            "list": [null, { "e": null, "f": 2 }]
        }));
        strip_unset(&mut map);

        assert_eq!(
            Value::Object(map),
            json!({ "b": 1, "nested": { "d": "x" }, "list": [null, { "f": 2 }] })
        );
    }

    #[test]
    fn test_entry_builder() {
        let entry = Entry::new()
            .with("userId", "u1")
            .with("attempts", 3)
            .with("missing", None::<String>)
            .msg("hello");

        assert_eq!(entry.msg.as_deref(), Some("hello"));
        assert_eq!(entry.fields["userId"], json!("u1"));
        assert!(entry.fields["missing"].is_null());
    }

    #[test]
    fn test_non_object_value_becomes_value_field() {
        assert_eq!(Value::Object(fields(json!(42))), json!({ "value": 42 }));
        assert!(fields(Value::Null).is_empty());
    }

    #[test]
    fn test_record_reserves_level_and_time() {
        let record = Record {
            level: LogLevel::Warn,
            time: DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            fields: fields(json!({ "level": "bogus", "time": "bogus", "msg": "m" })),
        };
        let value = record.to_value();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["time"], "2024-01-15T10:00:00.000Z");
        assert_eq!(record.msg(), Some("m"));
    }

    #[test]
    fn test_from_value_reads_rendered_line() {
        let line = r#"{"level":"error","time":"2024-01-15T10:00:00.250Z","msg":"Request failed","requestId":"r1"}"#;
        let record = Record::from_value(serde_json::from_str(line).unwrap()).unwrap();

        assert_eq!(record.level, LogLevel::Error);
        assert_eq!(record.time_rfc3339(), "2024-01-15T10:00:00.250Z");
        assert_eq!(record.msg(), Some("Request failed"));
        assert!(!record.fields.contains_key("level"));

        assert!(Record::from_value(json!({ "msg": "no level" })).is_none());
        assert!(Record::from_value(json!({ "level": "loud", "time": "2024-01-15T10:00:00Z" })).is_none());
    }
}
