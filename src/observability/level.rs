//! Severity levels and minimum-level thresholds.
//!
//! # Ordering
//! ```text
//! fatal(60) > error(50) > warn(40) > info(30) > debug(20) > trace(10)
//! ```
//!
//! A record is emitted when its level weight is at least the threshold
//! weight. `Threshold::Silent` sits above `fatal` and lets nothing through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a logger from runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The minimum-level override is not one of the six level names.
    #[error("invalid log level '{0}' (expected one of: trace, debug, info, warn, error, fatal)")]
    InvalidLevel(String),
}

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// All levels, least severe first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Integer weight of the level.
    pub fn weight(self) -> u8 {
        match self {
            LogLevel::Trace => 10,
            LogLevel::Debug => 20,
            LogLevel::Info => 30,
            LogLevel::Warn => 40,
            LogLevel::Error => 50,
            LogLevel::Fatal => 60,
        }
    }

    /// Lowercase level name as it appears in records.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Closest `tracing` level. `fatal` has no counterpart and maps to `ERROR`.
    pub fn to_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Fatal => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == name)
            .ok_or_else(|| ConfigurationError::InvalidLevel(s.to_string()))
    }
}

/// Minimum level a logger lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    At(LogLevel),
    /// Above `fatal`; nothing is emitted.
    Silent,
}

impl Threshold {
    /// Weight of the threshold. `Silent` is one step above `fatal`.
    pub fn weight(self) -> u8 {
        match self {
            Threshold::At(level) => level.weight(),
            Threshold::Silent => LogLevel::Fatal.weight() + 10,
        }
    }

    /// Whether a record at `level` passes this threshold.
    pub fn allows(self, level: LogLevel) -> bool {
        level.weight() >= self.weight()
    }

    /// Name used in diagnostics ("silent" for the muted threshold).
    pub fn as_str(self) -> &'static str {
        match self {
            Threshold::At(level) => level.as_str(),
            Threshold::Silent => "silent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_are_strictly_increasing() {
        let weights: Vec<u8> = LogLevel::ALL.iter().map(|l| l.weight()).collect();
        assert_eq!(weights, vec![10, 20, 30, 40, 50, 60]);
        assert!(LogLevel::Fatal > LogLevel::Error);
        assert!(LogLevel::Trace < LogLevel::Debug);
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" WARN ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(ConfigurationError::InvalidLevel("verbose".to_string()))
        );
    }

    #[test]
    fn test_threshold_filters_below_minimum() {
        let threshold = Threshold::At(LogLevel::Warn);
        for level in LogLevel::ALL {
            assert_eq!(threshold.allows(level), level >= LogLevel::Warn, "{level}");
        }
    }

    #[test]
    fn test_silent_threshold_allows_nothing() {
        assert!(LogLevel::ALL.iter().all(|l| !Threshold::Silent.allows(*l)));
    }
}
