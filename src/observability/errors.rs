//! Error normalization and the error logging helper.
//!
//! Anything a caller wants to report as a failure is normalized once into a
//! `NormalizedError` before it becomes part of a record:
//!
//! ```text
//! &E: std::error::Error  → Standard { name: type name, message, stack: cause chain }
//! panic payload / value  → Unknown { value }   → { name: "Unknown", message }
//! ```
//!
//! Logging an error never fails and never panics.

use std::any::Any;
use std::error::Error;
use std::fmt;

use serde_json::{Map, Value};

use super::logger::Logger;
use super::record::{Entry, Fields};

/// Name reported for values that are not structured errors.
pub const UNKNOWN_ERROR_NAME: &str = "Unknown";

/// A failure reduced to loggable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedError {
    Standard {
        name: String,
        message: String,
        stack: Option<String>,
    },
    Unknown {
        value: String,
    },
}

impl NormalizedError {
    pub fn standard(name: impl Into<String>, message: impl Into<String>) -> Self {
        NormalizedError::Standard {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Attach a stack. No effect on `Unknown`.
    pub fn with_stack(self, stack: impl Into<String>) -> Self {
        match self {
            NormalizedError::Standard { name, message, .. } => NormalizedError::Standard {
                name,
                message,
                stack: Some(stack.into()),
            },
            unknown => unknown,
        }
    }

    pub fn unknown(value: impl fmt::Display) -> Self {
        NormalizedError::Unknown {
            value: value.to_string(),
        }
    }

    /// Normalize a concrete error type, naming it after the type.
    pub fn from_typed<E: Error + 'static>(err: &E) -> Self {
        NormalizedError::Standard {
            name: short_type_name(std::any::type_name::<E>()),
            message: err.to_string(),
            stack: cause_chain(err),
        }
    }

    /// Normalize a type-erased error.
    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        NormalizedError::Standard {
            name: "Error".to_string(),
            message: err.to_string(),
            stack: cause_chain(err),
        }
    }

    /// Normalize a panic payload as caught by `catch_unwind`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&'static str>() {
            NormalizedError::unknown(s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            NormalizedError::unknown(s)
        } else {
            NormalizedError::unknown("Box<dyn Any>")
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NormalizedError::Standard { name, .. } => name,
            NormalizedError::Unknown { .. } => UNKNOWN_ERROR_NAME,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            NormalizedError::Standard { message, .. } => message,
            NormalizedError::Unknown { value } => value,
        }
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            NormalizedError::Standard { stack, .. } => stack.as_deref(),
            NormalizedError::Unknown { .. } => None,
        }
    }

    /// `{name, message, stack?}` as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(self.name()));
        map.insert("message".to_string(), Value::from(self.message()));
        if let Some(stack) = self.stack() {
            map.insert("stack".to_string(), Value::from(stack));
        }
        Value::Object(map)
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl<E: Error + 'static> From<&E> for NormalizedError {
    fn from(err: &E) -> Self {
        NormalizedError::from_typed(err)
    }
}

impl From<Box<dyn Error + Send + Sync>> for NormalizedError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        NormalizedError::from_dyn(&*err)
    }
}

impl Logger {
    /// Emit one `error` record `{..context, error, msg: "Error occurred"}`.
    pub fn log_error(&self, err: impl Into<NormalizedError>, context: Fields) {
        let err = err.into();
        self.error(
            Entry::from(context)
                .with("error", err.to_value())
                .msg("Error occurred"),
        );
    }
}

/// `my_crate::module::MyError<T>` → `MyError`.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// `source()` chain, one cause per line.
fn cause_chain(err: &(dyn Error + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}
