//! Request-logging middleware.
//!
//! # Flow
//! ```text
//! call(req, res)
//!     ├─ path == health path (trailing '/' ignored) → handler, no records
//!     ├─ RequestContext (request id, start time, request logger)
//!     ├─ info  "Incoming request"  {method, url, query, body (non-GET)}
//!     ├─ handler(ctx, req, LoggedResponse(res))
//!     │      send_json / send_raw / end
//!     │        → info "Request completed" {requestId, statusCode, duration,
//!     │                                    responseBody (status >= 400)}
//!     │        → delegate to res unchanged
//!     ├─ Err(e)  → error "Request failed" {requestId, duration, error}; return Err(e)
//!     ├─ deadline passed → handler dropped; "Request failed" with a Timeout error
//!     └─ panic   → error "Request failed" {.., error: Unknown}; resume the panic
//! ```
//!
//! # Design Decisions
//! - The middleware observes; it never writes an error response itself
//! - The completion record fires per emitting call, so a handler that emits
//!   twice produces two completion records

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use futures_util::FutureExt;
use serde_json::Value;

use crate::http::error::HandlerError;
use crate::http::handler::ApiHandler;
use crate::http::middleware::RequestContext;
use crate::http::request::{same_path, ApiRequest, X_REQUEST_ID};
use crate::http::response::ApiResponse;
use crate::observability::{Entry, Logger, NormalizedError};

/// Health probe path used unless overridden.
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

/// Wrap `handler` with request logging.
pub fn with_logging<H: ApiHandler>(logger: &Logger, handler: H) -> LoggedHandler<H> {
    LoggedHandler {
        handler,
        logger: logger.clone(),
        health_path: DEFAULT_HEALTH_PATH.to_string(),
        timeout: None,
    }
}

/// A handler wrapped by [`with_logging`].
pub struct LoggedHandler<H> {
    handler: H,
    logger: Logger,
    health_path: String,
    timeout: Option<Duration>,
}

impl<H: ApiHandler> LoggedHandler<H> {
    /// Requests to `path` bypass logging.
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Give the handler at most `limit`; past it the handler is dropped and
    /// the request fails with [`HandlerError::Timeout`].
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn inner(&self) -> &H {
        &self.handler
    }

    /// Run the wrapped handler for one request.
    pub async fn call(&self, req: &ApiRequest, res: &mut dyn ApiResponse) -> Result<(), HandlerError> {
        let ctx = RequestContext::new(&self.logger, req);

        if same_path(req.path(), &self.health_path) {
            return self.handler.handle(&ctx, req, res).await;
        }

        let body = if *req.method() == Method::GET {
            None
        } else {
            req.body().cloned()
        };
        ctx.logger().info(
            Entry::new()
                .with("method", req.method().as_str())
                .with("url", req.url())
                .with("query", Value::Object(req.query().clone()))
                .with("body", body)
                .msg("Incoming request"),
        );

        if let Ok(value) = HeaderValue::from_str(ctx.request_id().as_str()) {
            res.insert_header(HeaderName::from_static(X_REQUEST_ID), value);
        }

        let mut logged = LoggedResponse { inner: res, ctx: &ctx };
        let handled = AssertUnwindSafe(self.handler.handle(&ctx, req, &mut logged)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, handled).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let err = HandlerError::Timeout {
                        limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    };
                    log_failure(&ctx, NormalizedError::from_typed(&err));
                    return Err(err);
                }
            },
            None => handled.await,
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                log_failure(&ctx, NormalizedError::from_typed(&err));
                Err(err)
            }
            Err(panic) => {
                log_failure(&ctx, NormalizedError::from_panic(panic.as_ref()));
                std::panic::resume_unwind(panic)
            }
        }
    }
}

fn log_failure(ctx: &RequestContext, err: NormalizedError) {
    ctx.logger().error(
        Entry::new()
            .with("requestId", ctx.request_id().as_str())
            .with("duration", ctx.elapsed_ms())
            .with("error", err.to_value())
            .msg("Request failed"),
    );
}

/// Response decorator that records completion before each emitting call.
pub struct LoggedResponse<'a> {
    inner: &'a mut dyn ApiResponse,
    ctx: &'a RequestContext,
}

impl LoggedResponse<'_> {
    fn record_completion(&self, body: Option<Value>) {
        let status = self.inner.status();
        let response_body = if status.as_u16() >= 400 { body } else { None };
        self.ctx.logger().info(
            Entry::new()
                .with("requestId", self.ctx.request_id().as_str())
                .with("statusCode", status.as_u16())
                .with("duration", self.ctx.elapsed_ms())
                .with("responseBody", response_body)
                .msg("Request completed"),
        );
    }
}

impl ApiResponse for LoggedResponse<'_> {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.set_status(status);
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.insert_header(name, value);
    }

    fn send_json(&mut self, body: Value) {
        self.record_completion(Some(body.clone()));
        self.inner.send_json(body);
    }

    fn send_raw(&mut self, body: Bytes) {
        self.record_completion(Some(Value::from(String::from_utf8_lossy(&body).into_owned())));
        self.inner.send_raw(body);
    }

    fn end(&mut self) {
        self.record_completion(None);
        self.inner.end();
    }
}
