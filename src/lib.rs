//! Structured logging and request observability for HTTP services.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ──▶ http::middleware::logging ──▶ api routes
//!                        │                    │                        │
//!                        │          Incoming / Completed / Failed      │ timers, audit,
//!                        │                    │                        │ error records
//!                        ▼                    ▼                        ▼
//!                 ┌───────────────────────────────────────────────────────────┐
//!                 │                      observability                        │
//!                 │  level → logger (children) → record → redaction → format  │
//!                 │                                             → sink        │
//!                 └───────────────────────────────────────────────────────────┘
//!                        ▲                                          ▲
//!                     config                                    lifecycle
//!               (file + environment)                       (signals, shutdown)
//! ```

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{AppConfig, Environment, RuntimeConfig};
pub use http::{with_logging, ApiHandler, HttpServer};
pub use lifecycle::Shutdown;
pub use observability::{create_logger, AuditTrail, Logger, LogLevel, NormalizedError, Timer};
