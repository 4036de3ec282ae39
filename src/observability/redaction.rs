//! Sensitive-field redaction.
//!
//! # Responsibilities
//! - Parse field paths (`password`, `req.headers.authorization`,
//!   `res.headers["set-cookie"]`, `*.token`, `**.password`)
//! - Replace the value at every matching path with a fixed censor string
//!
//! # Design Decisions
//! - Only existing keys are censored; paths never add fields
//! - `*` matches any single key at that depth, `**` any number of keys
//!   (zero included)
//! - Arrays are transparent: a path continues into every element
//! - Applied to the assembled record, after base and caller fields merge

use serde_json::Value;

use super::record::Fields;

/// Replacement written in place of redacted values.
pub const CENSOR: &str = "[REDACTED]";

/// Sensitive keys censored at any depth.
const SENSITIVE_KEYS: [&str; 5] = ["password", "token", "secret", "authorization", "cookie"];

/// Header paths censored in request/response snapshots.
const HEADER_PATHS: [&str; 3] = [
    "req.headers.authorization",
    "req.headers.cookie",
    r#"res.headers["set-cookie"]"#,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Any,
    AnyDepth,
}

impl Segment {
    fn parse(key: String) -> Self {
        match key.as_str() {
            "*" => Segment::Any,
            "**" => Segment::AnyDepth,
            _ => Segment::Key(key),
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Segment::Key(k) => k == key,
            Segment::Any | Segment::AnyDepth => true,
        }
    }
}

/// A set of field paths mapped to the censor value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRules {
    paths: Vec<Vec<Segment>>,
    censor: String,
}

impl RedactionRules {
    /// Build rules from path expressions. Empty paths are ignored.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| parse_path(p.as_ref()))
                .filter(|segments| !segments.is_empty())
                .collect(),
            censor: CENSOR.to_string(),
        }
    }

    /// The production rule set.
    pub fn standard() -> Self {
        let paths: Vec<String> = SENSITIVE_KEYS
            .iter()
            .map(|k| format!("**.{k}"))
            .chain(HEADER_PATHS.iter().map(|p| p.to_string()))
            .collect();
        Self::new(paths)
    }

    /// Override the censor string.
    pub fn with_censor(mut self, censor: impl Into<String>) -> Self {
        self.censor = censor.into();
        self
    }

    pub fn censor(&self) -> &str {
        &self.censor
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Censor every matching path in `fields`.
    pub fn apply(&self, fields: &mut Fields) {
        for path in &self.paths {
            redact(fields, path, &self.censor);
        }
    }
}

fn redact(map: &mut Fields, path: &[Segment], censor: &str) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    if *head == Segment::AnyDepth {
        redact(map, rest, censor);
        for value in map.values_mut() {
            descend(value, path, censor);
        }
        return;
    }

    for (key, value) in map.iter_mut() {
        if !head.matches(key) {
            continue;
        }
        if rest.is_empty() {
            *value = Value::from(censor);
        } else {
            descend(value, rest, censor);
        }
    }
}

fn descend(value: &mut Value, path: &[Segment], censor: &str) {
    match value {
        Value::Object(inner) => redact(inner, path, censor),
        Value::Array(items) => {
            for item in items {
                descend(item, path, censor);
            }
        }
        _ => {}
    }
}

/// Split `a.b["c-d"].*` into segments.
fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => push_segment(&mut segments, &mut current),
            '[' => {
                push_segment(&mut segments, &mut current);
                let quote = match chars.peek() {
                    Some('"') | Some('\'') => chars.next(),
                    _ => None,
                };
                let mut key = String::new();
                for c in chars.by_ref() {
                    if Some(c) == quote || (quote.is_none() && c == ']') {
                        break;
                    }
                    key.push(c);
                }
                if quote.is_some() {
                    // consume the closing bracket
                    let _ = chars.next_if_eq(&']');
                }
                segments.push(Segment::parse(key));
            }
            _ => current.push(c),
        }
    }
    push_segment(&mut segments, &mut current);
    segments
}

fn push_segment(segments: &mut Vec<Segment>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    segments.push(Segment::parse(std::mem::take(current)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::record::fields;
    use serde_json::json;

    #[test]
    fn test_parse_bracket_and_dot_paths() {
        assert_eq!(
            parse_path(r#"res.headers["set-cookie"]"#),
            vec![
                Segment::Key("res".into()),
                Segment::Key("headers".into()),
                Segment::Key("set-cookie".into()),
            ]
        );
        assert_eq!(
            parse_path("*.token"),
            vec![Segment::Any, Segment::Key("token".into())]
        );
        assert_eq!(
            parse_path("**.secret"),
            vec![Segment::AnyDepth, Segment::Key("secret".into())]
        );
        assert!(parse_path("  ").is_empty());
    }

    #[test]
    fn test_standard_rules_censor_top_level_and_nested() {
        let mut record = fields(json!({
            "password": "hunter2",
            "body": { "email": "a@b.c", "password": "hunter2" },
            "req": { "headers": { "authorization": "Bearer abc", "accept": "*/*" } },
            "res": { "headers": { "set-cookie": "sid=1" } },
        }));
        RedactionRules::standard().apply(&mut record);

        assert_eq!(record["password"], CENSOR);
        assert_eq!(record["body"]["password"], CENSOR);
        assert_eq!(record["body"]["email"], "a@b.c");
        assert_eq!(record["req"]["headers"]["authorization"], CENSOR);
        assert_eq!(record["req"]["headers"]["accept"], "*/*");
        assert_eq!(record["res"]["headers"]["set-cookie"], CENSOR);
        assert!(!Value::Object(record).to_string().contains("hunter2"));
    }

    #[test]
    fn test_standard_rules_reach_any_depth_and_arrays() {
        let mut record = fields(json!({
            "body": {
                "user": { "name": "Ada", "password": "hunter2" },
                "sessions": [{ "token": "t0k3n", "device": "web" }, "plain"],
            },
            "deep": [[{ "secret": { "value": "s3cret" } }]],
        }));
        RedactionRules::standard().apply(&mut record);

        assert_eq!(record["body"]["user"]["password"], CENSOR);
        assert_eq!(record["body"]["user"]["name"], "Ada");
        assert_eq!(record["body"]["sessions"][0]["token"], CENSOR);
        assert_eq!(record["body"]["sessions"][0]["device"], "web");
        assert_eq!(record["body"]["sessions"][1], "plain");
        assert_eq!(record["deep"][0][0]["secret"], CENSOR);

        let line = Value::Object(record).to_string();
        assert!(!line.contains("hunter2"));
        assert!(!line.contains("t0k3n"));
        assert!(!line.contains("s3cret"));
    }

    #[test]
    fn test_explicit_path_continues_into_arrays() {
        let mut record = fields(json!({ "items": [{ "pin": 1 }, { "pin": 2, "id": 3 }] }));
        RedactionRules::new(["items.pin"]).apply(&mut record);
        assert_eq!(
            Value::Object(record),
            json!({ "items": [{ "pin": CENSOR }, { "pin": CENSOR, "id": 3 }] })
        );
    }

    #[test]
    fn test_missing_paths_are_not_added() {
        let mut record = fields(json!({ "user": "u1" }));
        RedactionRules::standard().apply(&mut record);
        assert_eq!(Value::Object(record), json!({ "user": "u1" }));
    }

    #[test]
    fn test_custom_censor() {
        let mut record = fields(json!({ "apiKey": "k" }));
        RedactionRules::new(["apiKey"]).with_censor("***").apply(&mut record);
        assert_eq!(record["apiKey"], "***");
    }
}
