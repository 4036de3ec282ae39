//! Logger core and context-scoped child loggers.
//!
//! # Responsibilities
//! - Resolve threshold, output format and redaction from `RuntimeConfig`
//! - Inject base fields (pid, hostname, service, version, env)
//! - Assemble, clean, redact, render and write records
//! - Derive child loggers carrying extra fixed fields
//!
//! # Design Decisions
//! - One `Logger` is built at process entry and passed explicitly
//! - Children share the parent's core (threshold, redaction, sink, clock)
//!   through an `Arc`; only the base field map is copied
//! - Loggers are immutable once built and safe to share across tasks

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::format::{Formatter, LogFormat};
use super::level::{ConfigurationError, LogLevel, Threshold};
use super::record::{strip_unset, Entry, Fields, Record};
use super::redaction::RedactionRules;
use super::sink::{DiscardSink, Sink, StdoutSink};
use crate::config::{Environment, RuntimeConfig};

/// Shared configuration of a logger family.
struct Core {
    threshold: Threshold,
    redaction: Option<RedactionRules>,
    formatter: Formatter,
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
}

/// Structured logger. Cheap to clone; clones and children share one sink.
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    base: Arc<Fields>,
}

/// Build a logger from runtime configuration, writing to `sink`.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidLevel` when the level override is not
/// one of the six level names.
pub fn create_logger(config: &RuntimeConfig, sink: Arc<dyn Sink>) -> Result<Logger, ConfigurationError> {
    Ok(LoggerBuilder::from_config(config)?.sink(sink).build())
}

/// Threshold for an environment and optional override.
///
/// The override is validated in every environment but only applied outside
/// `test`, which is always silent.
pub fn resolve_threshold(
    environment: Environment,
    level_override: Option<&str>,
) -> Result<Threshold, ConfigurationError> {
    let parsed = level_override
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<LogLevel>)
        .transpose()?;

    Ok(match (environment, parsed) {
        (Environment::Test, _) => Threshold::Silent,
        (_, Some(level)) => Threshold::At(level),
        (Environment::Development, None) => Threshold::At(LogLevel::Debug),
        (Environment::Production, None) => Threshold::At(LogLevel::Info),
    })
}

impl Logger {
    /// Logger built from configuration, writing to stdout (discarding in `test`).
    ///
    /// # Errors
    ///
    /// See [`create_logger`].
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ConfigurationError> {
        let sink: Arc<dyn Sink> = match config.environment {
            Environment::Test => Arc::new(DiscardSink),
            _ => Arc::new(StdoutSink),
        };
        create_logger(config, sink)
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn threshold(&self) -> Threshold {
        self.core.threshold
    }

    pub fn format(&self) -> LogFormat {
        self.core.formatter.format()
    }

    pub fn redacts(&self) -> bool {
        self.core.redaction.is_some()
    }

    /// Fields merged into every record from this logger.
    pub fn base_fields(&self) -> &Fields {
        &self.base
    }

    /// Current time from the logger's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.core.clock.now()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.core.threshold.allows(level)
    }

    /// Emit one record at `level`.
    pub fn log(&self, level: LogLevel, entry: impl Into<Entry>) {
        if !self.is_enabled(level) {
            return;
        }
        let entry = entry.into();

        let mut fields = Fields::clone(&self.base);
        fields.extend(entry.fields);
        if let Some(msg) = entry.msg {
            fields.insert("msg".to_string(), Value::from(msg));
        }
        strip_unset(&mut fields);
        if let Some(rules) = &self.core.redaction {
            rules.apply(&mut fields);
        }

        let record = Record {
            level,
            time: self.core.clock.now(),
            fields,
        };
        let line = self.core.formatter.render(&record);
        self.core.sink.write(&record, &line);
    }

    pub fn trace(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Trace, entry);
    }

    pub fn debug(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Debug, entry);
    }

    pub fn info(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Info, entry);
    }

    pub fn warn(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Warn, entry);
    }

    pub fn error(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Error, entry);
    }

    pub fn fatal(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Fatal, entry);
    }

    /// Derive a logger whose base fields are this logger's with `extra` on top.
    pub fn child(&self, extra: Fields) -> Logger {
        let mut base = Fields::clone(&self.base);
        base.extend(extra);
        Logger {
            core: Arc::clone(&self.core),
            base: Arc::new(base),
        }
    }

    /// Child with a single extra field.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Logger {
        let mut extra = Fields::new();
        extra.insert(key.into(), value.into());
        self.child(extra)
    }

    /// Child tagged with a component name.
    pub fn component(&self, name: &str) -> Logger {
        self.with_field("component", name)
    }

    /// Child for the database layer.
    pub fn database(&self) -> Logger {
        self.component("database")
    }

    /// Child for the authentication layer.
    pub fn auth(&self) -> Logger {
        self.component("auth")
    }

    /// Child typed as the audit trail.
    pub fn audit(&self) -> Logger {
        self.with_field("type", "audit")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.core.threshold)
            .field("format", &self.core.formatter.format())
            .field("redacts", &self.redacts())
            .field("base", &self.base)
            .finish()
    }
}

/// Step-by-step logger construction.
pub struct LoggerBuilder {
    threshold: Threshold,
    redaction: Option<RedactionRules>,
    formatter: Formatter,
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
    base: Fields,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            threshold: Threshold::At(LogLevel::Info),
            redaction: None,
            formatter: Formatter::new(LogFormat::Json),
            sink: Arc::new(StdoutSink),
            clock: Arc::new(SystemClock),
            base: Fields::new(),
        }
    }
}

impl LoggerBuilder {
    /// Builder preloaded with the environment's threshold, format, redaction
    /// and base fields.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidLevel` for an unknown level override.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ConfigurationError> {
        let threshold = resolve_threshold(config.environment, config.log_level.as_deref())?;

        let format = if config.environment == Environment::Development || config.log_pretty {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        let redaction = (config.environment == Environment::Production).then(RedactionRules::standard);

        let mut base = Fields::new();
        base.insert("pid".to_string(), Value::from(config.pid));
        base.insert("hostname".to_string(), Value::from(config.hostname.clone()));
        base.insert("service".to_string(), Value::from(config.service_name.clone()));
        base.insert("version".to_string(), Value::from(config.service_version.clone()));
        base.insert("env".to_string(), Value::from(config.environment.as_str()));

        Ok(Self {
            threshold,
            redaction,
            formatter: Formatter::new(format),
            base,
            ..Self::default()
        })
    }

    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn level(self, level: LogLevel) -> Self {
        self.threshold(Threshold::At(level))
    }

    pub fn redaction(mut self, rules: RedactionRules) -> Self {
        self.redaction = Some(rules);
        self
    }

    pub fn without_redaction(mut self) -> Self {
        self.redaction = None;
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            core: Arc::new(Core {
                threshold: self.threshold,
                redaction: self.redaction,
                formatter: self.formatter,
                sink: self.sink,
                clock: self.clock,
            }),
            base: Arc::new(self.base),
        }
    }
}
