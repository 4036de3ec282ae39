//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use reqlog::config::{Environment, RuntimeConfig};
use reqlog::observability::{create_logger, Logger, LoggerBuilder, ManualClock, MemorySink};

/// A production-style config with fixed identity fields.
pub fn production_config() -> RuntimeConfig {
    RuntimeConfig {
        environment: Environment::Production,
        log_level: None,
        log_pretty: false,
        service_name: "reqlog-test".to_string(),
        service_version: "1.2.3".to_string(),
        hostname: "test-host".to_string(),
        pid: 4242,
    }
}

/// Logger capturing JSON lines in memory with a controllable clock.
pub struct Harness {
    pub logger: Logger,
    pub sink: MemorySink,
    pub clock: Arc<ManualClock>,
}

/// Build a [`Harness`] from `config`.
pub fn harness(config: &RuntimeConfig) -> Harness {
    let sink = MemorySink::new();
    let clock = Arc::new(ManualClock::default());
    let logger = LoggerBuilder::from_config(config)
        .expect("valid test config")
        .sink(Arc::new(sink.clone()))
        .clock(clock.clone())
        .build();
    Harness { logger, sink, clock }
}

/// Production logger writing to `sink` with the system clock.
pub fn production_logger(sink: &MemorySink) -> Logger {
    create_logger(&production_config(), Arc::new(sink.clone())).expect("valid test config")
}
