//! Demo application served by the `reqlog` binary.
//!
//! # Data Flow
//! ```text
//! axum fallback (http/server.rs)
//!     → LoggedHandler (request logging)
//!     → routes.rs (ApiRoutes)
//!         → users.rs (UserStore, timed through the database logger)
//!         → audit trail for auth events
//! ```

pub mod routes;
pub mod users;

pub use routes::ApiRoutes;
pub use users::{User, UserStore};
