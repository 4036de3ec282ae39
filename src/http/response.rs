//! Response abstraction and its buffered implementation.
//!
//! # Responsibilities
//! - Define the three emitting operations (`send_json`, `send_raw`, `end`)
//!   that the logging middleware intercepts
//! - Buffer what a handler writes and turn it into an axum `Response`
//!
//! # Design Decisions
//! - The first emitting call commits the response; later ones leave the
//!   buffer unchanged
//! - Status and headers stay mutable until the handler returns

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// What a handler writes its response through.
pub trait ApiResponse: Send {
    fn status(&self) -> StatusCode;

    fn set_status(&mut self, status: StatusCode);

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Send a JSON body.
    fn send_json(&mut self, body: Value);

    /// Send raw bytes.
    fn send_raw(&mut self, body: Bytes);

    /// Finish without a body.
    fn end(&mut self);

    /// Set the status and send a JSON body.
    fn json(&mut self, status: StatusCode, body: Value) {
        self.set_status(status);
        self.send_json(body);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Json(Value),
    Raw(Bytes),
    Empty,
}

/// Collects a handler's response in memory.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    payload: Option<Payload>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            payload: None,
        }
    }

    /// Whether any emitting operation has run.
    pub fn is_sent(&self) -> bool {
        self.payload.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.payload {
            Some(Payload::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn raw_body(&self) -> Option<&Bytes> {
        match &self.payload {
            Some(Payload::Raw(bytes)) => Some(bytes),
            _ => None,
        }
    }

    fn commit(&mut self, payload: Payload) {
        if self.payload.is_none() {
            self.payload = Some(payload);
        }
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiResponse for BufferedResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn send_json(&mut self, body: Value) {
        self.commit(Payload::Json(body));
    }

    fn send_raw(&mut self, body: Bytes) {
        self.commit(Payload::Raw(body));
    }

    fn end(&mut self) {
        self.commit(Payload::Empty);
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut headers = self.headers;
        let body = match self.payload {
            Some(Payload::Json(value)) => {
                headers
                    .entry(header::CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static("application/json"));
                Body::from(value.to_string())
            }
            Some(Payload::Raw(bytes)) => Body::from(bytes),
            Some(Payload::Empty) | None => Body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_send_commits() {
        let mut res = BufferedResponse::new();
        res.json(StatusCode::CREATED, json!({ "id": 1 }));
        res.send_raw(Bytes::from_static(b"ignored"));
        res.end();

        assert!(res.is_sent());
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.json_body(), Some(&json!({ "id": 1 })));
        assert!(res.raw_body().is_none());
    }

    #[tokio::test]
    async fn test_into_response_sets_json_content_type() {
        let mut res = BufferedResponse::new();
        res.send_json(json!({ "ok": true }));
        let response = res.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }
}
