//! HTTP middleware.
//!
//! - `logging.rs`: request/response/error records around a handler
//! - `context.rs`: the per-request context handed to handlers

mod context;
pub mod logging;

pub use context::RequestContext;
pub use logging::{with_logging, LoggedHandler, LoggedResponse, DEFAULT_HEALTH_PATH};
