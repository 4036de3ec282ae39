//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, limits, timeout)
//!     → request.rs (buffer body, request ID, metadata)
//!     → middleware/logging.rs (inbound record, completion records, failures)
//!     → handler.rs (ApiHandler seam, application code)
//!     → response.rs (buffered response, emitting operations)
//!     → error.rs (handler errors rendered by the host)
//!     → Send to client
//! ```

pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::HandlerError;
pub use handler::{sync_handler, ApiHandler, SyncHandler};
pub use middleware::{with_logging, LoggedHandler, RequestContext};
pub use request::{ApiRequest, RequestId, X_REQUEST_ID};
pub use response::{ApiResponse, BufferedResponse};
pub use server::{AppState, HttpServer};
