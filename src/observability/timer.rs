//! Performance timers.
//!
//! ```text
//! logger.start_timer("db.findUser")     captures start, binds child
//!     {operation: "db.findUser", type: "performance"}
//! timer.complete(fields)                emits info {..fields, duration, msg}
//!                                       returns duration (ms)
//! ```
//!
//! A timer that is dropped without `complete` emits nothing.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::clock::millis_between;
use super::errors::NormalizedError;
use super::logger::Logger;
use super::record::{Entry, Fields};

/// Handle for one timed operation.
#[derive(Debug, Clone)]
#[must_use = "a timer emits nothing until `complete` is called"]
pub struct Timer {
    operation: String,
    started_at: DateTime<Utc>,
    logger: Logger,
}

impl Timer {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Milliseconds since the timer started, without emitting.
    pub fn elapsed_ms(&self) -> u64 {
        millis_between(self.started_at, self.logger.now())
    }

    /// Emit the completion record and return the duration in milliseconds.
    ///
    /// Each call emits a record; callers complete a logical operation once.
    pub fn complete(&self, extra: Fields) -> u64 {
        let duration = self.elapsed_ms();
        self.logger.info(
            Entry::from(extra)
                .with("duration", duration)
                .msg(format!("Operation {} completed", self.operation)),
        );
        duration
    }
}

impl Logger {
    /// Start timing `operation`.
    pub fn start_timer(&self, operation: impl Into<String>) -> Timer {
        let operation = operation.into();
        let logger = self.child(super::record::fields(json!({
            "operation": operation.as_str(),
            "type": "performance",
        })));
        Timer {
            started_at: logger.now(),
            operation,
            logger,
        }
    }

    /// Time a fallible future.
    ///
    /// `Ok` completes the timer. `Err` is logged through
    /// [`Logger::log_error`] with the operation and elapsed time, then
    /// returned unchanged.
    pub async fn time<T, E, F>(&self, operation: impl Into<String>, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let timer = self.start_timer(operation);
        match future.await {
            Ok(value) => {
                timer.complete(Fields::new());
                Ok(value)
            }
            Err(err) => {
                let mut context = Fields::new();
                context.insert("operation".to_string(), Value::from(timer.operation()));
                context.insert("duration".to_string(), Value::from(timer.elapsed_ms()));
                self.log_error(NormalizedError::from_typed(&err), context);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::clock::ManualClock;
    use crate::observability::record::fields;
    use crate::observability::sink::MemorySink;
    use std::sync::Arc;

    fn setup() -> (Logger, MemorySink, Arc<ManualClock>) {
        let sink = MemorySink::new();
        let clock = Arc::new(ManualClock::default());
        let logger = Logger::builder()
            .sink(Arc::new(sink.clone()))
            .clock(clock.clone())
            .build();
        (logger, sink, clock)
    }

    #[test]
    fn test_complete_reports_simulated_duration() {
        let (logger, sink, clock) = setup();
        let timer = logger.start_timer("db.findUser");
        clock.advance_ms(120);

        let duration = timer.complete(fields(json!({ "rows": 1 })));

        assert_eq!(duration, 120);
        let record = &sink.records()[0];
        assert_eq!(record["duration"], 120);
        assert_eq!(record["rows"], 1);
        assert_eq!(record["operation"], "db.findUser");
        assert_eq!(record["type"], "performance");
        assert_eq!(record["msg"], "Operation db.findUser completed");
        assert_eq!(record["level"], "info");
    }

    #[test]
    fn test_uncompleted_timer_emits_nothing() {
        let (logger, sink, clock) = setup();
        {
            let _timer = logger.start_timer("abandoned");
            clock.advance_ms(5);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_repeated_complete_emits_growing_durations() {
        let (logger, sink, clock) = setup();
        let timer = logger.start_timer("op");
        clock.advance_ms(10);
        assert_eq!(timer.complete(Fields::new()), 10);
        clock.advance_ms(15);
        assert_eq!(timer.complete(Fields::new()), 25);
        assert_eq!(sink.len(), 2);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct DbDown;

    #[tokio::test]
    async fn test_time_logs_failure_and_returns_error() {
        let (logger, sink, _clock) = setup();
        let result: Result<(), DbDown> = logger.time("db.query", async { Err(DbDown) }).await;

        assert!(result.is_err());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "error");
        assert_eq!(records[0]["operation"], "db.query");
        assert_eq!(records[0]["error"]["name"], "DbDown");
        assert_eq!(records[0]["error"]["message"], "connection refused");
    }

    #[tokio::test]
    async fn test_time_completes_on_success() {
        let (logger, sink, _clock) = setup();
        let value: Result<u32, DbDown> = logger.time("db.count", async { Ok(7) }).await;
        assert_eq!(value.unwrap(), 7);
        assert_eq!(sink.records_with_msg("Operation db.count completed").len(), 1);
    }
}
