//! Request identity and the request view handlers see.
//!
//! # Responsibilities
//! - Assign a request ID (reuse a sane inbound `x-request-id`, else UUID v4)
//! - Buffer the body (bounded) and decode it: form posts become an object,
//!   JSON when it parses, text otherwise
//! - Extract logging-relevant metadata (query, user agent, client address)
//!
//! # Design Decisions
//! - Request ID assigned as early as possible for correlation
//! - Client address prefers `x-forwarded-for`, then `x-real-ip`, then the
//!   peer address of the connection

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, Query};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;

use crate::http::error::HandlerError;
use crate::observability::Fields;

/// Request correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

const MAX_INBOUND_ID_LEN: usize = 128;

/// Unique identifier of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Inbound `x-request-id` if it is short, non-empty visible ASCII.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(X_REQUEST_ID)?.to_str().ok()?.trim();
        let valid = !value.is_empty()
            && value.len() <= MAX_INBOUND_ID_LEN
            && value.bytes().all(|b| b.is_ascii_graphic());
        valid.then(|| Self(value.to_string()))
    }

    /// Inbound identifier when acceptable, else a fresh one.
    pub fn resolve(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound request as handlers and the logging middleware see it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Fields,
    body: Option<Value>,
    remote_addr: Option<SocketAddr>,
}

impl ApiRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = parse_query(&uri);
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            query,
            body: None,
            remote_addr: None,
        }
    }

    /// Buffer an axum request, refusing bodies over `limit` bytes.
    pub async fn from_axum(request: Request<Body>, limit: usize) -> Result<Self, HandlerError> {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(|_| HandlerError::PayloadTooLarge { limit })?;

        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut request = Self::new(parts.method, parts.uri);
        request.body = decode_body(&parts.headers, &bytes);
        request.headers = parts.headers;
        request.remote_addr = remote_addr;
        Ok(request)
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path plus query string, as requested.
    pub fn url(&self) -> String {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| self.uri.path().to_string())
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> &Fields {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let body = self
            .body
            .clone()
            .ok_or_else(|| HandlerError::BadRequest("missing request body".to_string()))?;
        serde_json::from_value(body).map_err(|e| HandlerError::BadRequest(e.to_string()))
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }

    /// Client address: first `x-forwarded-for` hop, then `x-real-ip`, then peer.
    pub fn client_ip(&self) -> Option<String> {
        let forwarded = self
            .header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        forwarded
            .or_else(|| self.header("x-real-ip").map(str::trim).filter(|v| !v.is_empty()))
            .map(str::to_string)
            .or_else(|| self.remote_addr.map(|addr| addr.ip().to_string()))
    }
}

/// Whether two request paths are equal, ignoring trailing slashes.
pub fn same_path(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

fn parse_query(uri: &Uri) -> Fields {
    Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| {
            params
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Form fields as an object for form posts; otherwise JSON when it parses,
/// text when it does not, nothing when empty.
fn decode_body(headers: &HeaderMap, bytes: &Bytes) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    if is_form(headers) {
        let form = form_urlencoded::parse(bytes)
            .map(|(k, v)| (k.into_owned(), Value::from(v.into_owned())))
            .collect();
        return Some(Value::Object(form));
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::from(String::from_utf8_lossy(bytes).into_owned())))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(uri: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn test_inbound_request_id_reused_when_sane() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(RequestId::resolve(&headers).as_str(), "abc-123");

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("has space"));
        assert_ne!(RequestId::resolve(&headers).as_str(), "has space");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_url_and_query() {
        let request = get("/api/users?page=2&sort=name");
        assert_eq!(request.url(), "/api/users?page=2&sort=name");
        assert_eq!(request.path(), "/api/users");
        assert_eq!(Value::Object(request.query().clone()), json!({ "page": "2", "sort": "name" }));
    }

    #[test]
    fn test_client_ip_preference() {
        let addr: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let request = get("/")
            .with_remote_addr(addr)
            .with_header(HeaderName::from_static("x-real-ip"), "9.9.9.9")
            .with_header(HeaderName::from_static("x-forwarded-for"), "1.2.3.4, 10.0.0.1");
        assert_eq!(request.client_ip().as_deref(), Some("1.2.3.4"));

        let request = get("/")
            .with_remote_addr(addr)
            .with_header(HeaderName::from_static("x-real-ip"), "9.9.9.9");
        assert_eq!(request.client_ip().as_deref(), Some("9.9.9.9"));

        assert_eq!(get("/").with_remote_addr(addr).client_ip().as_deref(), Some("10.0.0.9"));
        assert_eq!(get("/").client_ip(), None);
    }

    #[test]
    fn test_decode_body() {
        let none = HeaderMap::new();
        assert_eq!(decode_body(&none, &Bytes::new()), None);
        assert_eq!(decode_body(&none, &Bytes::from_static(b"{\"a\":1}")), Some(json!({ "a": 1 })));
        assert_eq!(decode_body(&none, &Bytes::from_static(b"plain")), Some(json!("plain")));
    }

    #[test]
    fn test_same_path_ignores_trailing_slash() {
        assert!(same_path("/api/health/", "/api/health"));
        assert!(same_path("/api/health", "/api/health//"));
        assert!(!same_path("/api/healthz", "/api/health"));
    }

    #[test]
    fn test_decode_form_body_into_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        let body = Bytes::from_static(b"email=a%40b.c&password=hunter2&name=Ada+L");

        assert_eq!(
            decode_body(&headers, &body),
            Some(json!({ "email": "a@b.c", "password": "hunter2", "name": "Ada L" }))
        );
    }

    #[tokio::test]
    async fn test_from_axum_enforces_limit() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();
        assert!(matches!(
            ApiRequest::from_axum(request, 16).await,
            Err(HandlerError::PayloadTooLarge { limit: 16 })
        ));
    }

    #[test]
    fn test_json_body() {
        #[derive(serde::Deserialize)]
        struct Login {
            email: String,
        }
        let request = get("/").with_body(json!({ "email": "a@b.c" }));
        assert_eq!(request.json::<Login>().unwrap().email, "a@b.c");
        assert!(matches!(get("/").json::<Login>(), Err(HandlerError::BadRequest(_))));
    }
}
