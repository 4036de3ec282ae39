//! Audit trail for security-relevant events.
//!
//! Every call to [`AuditTrail::log_event`] produces exactly one `info`
//! record through the audit-typed child logger:
//!
//! ```text
//! {type: "audit", event, userId?, ..context, timestamp, msg: "Audit event: <event>"}
//! ```
//!
//! The trail is append-only; reading it back is left to whatever consumes
//! the output stream.

use chrono::SecondsFormat;
use serde_json::Value;

use super::logger::Logger;
use super::record::{Entry, Fields};

/// Well-known event names.
pub mod events {
    pub const USER_LOGIN: &str = "user.login";
    pub const USER_LOGIN_FAILED: &str = "user.login_failed";
    pub const USER_LOGOUT: &str = "user.logout";
    pub const USER_REGISTER: &str = "user.register";
    pub const PASSWORD_RESET_REQUESTED: &str = "password.reset_requested";
    pub const PASSWORD_RESET: &str = "password.reset";
    pub const SESSION_REVOKED: &str = "session.revoked";
}

/// Emits audit events through an `audit`-typed child logger.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    logger: Logger,
}

impl AuditTrail {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.audit(),
        }
    }

    /// The underlying audit-typed logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Record one audit event.
    pub fn log_event(&self, event: &str, actor_id: Option<&str>, context: Fields) {
        let timestamp = self
            .logger
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        self.logger.info(
            Entry::new()
                .with("event", event)
                .with("userId", actor_id)
                .with_fields(context)
                .with("timestamp", Value::from(timestamp))
                .msg(format!("Audit event: {event}")),
        );
    }
}

impl Logger {
    /// Shorthand for `AuditTrail::new(self).log_event(..)`.
    pub fn log_audit_event(&self, event: &str, actor_id: Option<&str>, context: Fields) {
        AuditTrail::new(self).log_event(event, actor_id, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::clock::ManualClock;
    use crate::observability::record::fields;
    use crate::observability::redaction::RedactionRules;
    use crate::observability::sink::MemorySink;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        let logger = Logger::builder()
            .sink(Arc::new(sink.clone()))
            .clock(Arc::new(clock))
            .redaction(RedactionRules::standard())
            .build();
        (logger, sink)
    }

    #[test]
    fn test_login_event_record() {
        let (logger, sink) = setup();
        AuditTrail::new(&logger).log_event(
            events::USER_LOGIN,
            Some("u1"),
            fields(json!({ "ip": "1.2.3.4" })),
        );

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "info");
        assert_eq!(record["type"], "audit");
        assert_eq!(record["event"], "user.login");
        assert_eq!(record["userId"], "u1");
        assert_eq!(record["ip"], "1.2.3.4");
        assert_eq!(record["timestamp"], "2024-03-01T12:30:00.000Z");
    }

    #[test]
    fn test_anonymous_event_has_no_user_id() {
        let (logger, sink) = setup();
        logger.log_audit_event(events::PASSWORD_RESET_REQUESTED, None, Fields::new());

        let record = &sink.records()[0];
        assert!(record.get("userId").is_none());
        assert_eq!(record["msg"], "Audit event: password.reset_requested");
    }

    #[test]
    fn test_global_redaction_still_applies() {
        let (logger, sink) = setup();
        logger.log_audit_event(
            events::PASSWORD_RESET,
            Some("u2"),
            fields(json!({ "token": "reset-token-123" })),
        );
        assert_eq!(sink.records()[0]["token"], "[REDACTED]");
    }
}
