//! Per-request logging context.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::http::request::{ApiRequest, RequestId};
use crate::observability::clock::millis_between;
use crate::observability::{fields, Entry, Fields, Logger, NormalizedError};

/// Request identifier, start time and the request-scoped logger.
///
/// Lives for one handler invocation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    started_at: DateTime<Utc>,
    logger: Logger,
}

impl RequestContext {
    /// Derive the request logger `{requestId, method, url, userAgent, ip}`.
    pub fn new(logger: &Logger, req: &ApiRequest) -> Self {
        let request_id = RequestId::resolve(req.headers());
        let logger = logger.child(fields(json!({
            "requestId": request_id.as_str(),
            "method": req.method().as_str(),
            "url": req.url(),
            "userAgent": req.user_agent(),
            "ip": req.client_ip(),
        })));
        Self {
            request_id,
            started_at: logger.now(),
            logger,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Request-scoped logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Milliseconds since the request started.
    pub fn elapsed_ms(&self) -> u64 {
        millis_between(self.started_at, self.logger.now())
    }

    /// Record a named successful outcome.
    pub fn log_api_success(&self, operation: &str, extra: Fields) {
        self.logger.info(
            Entry::from(extra)
                .with("operation", operation)
                .with("duration", self.elapsed_ms())
                .msg(format!("{operation} succeeded")),
        );
    }

    /// Record a named failed outcome.
    pub fn log_api_error(&self, operation: &str, err: impl Into<NormalizedError>, extra: Fields) {
        let err = err.into();
        self.logger.error(
            Entry::from(extra)
                .with("operation", operation)
                .with("duration", self.elapsed_ms())
                .with("error", err.to_value())
                .msg(format!("{operation} failed")),
        );
    }
}
