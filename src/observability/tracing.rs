//! Diagnostics for framework internals.
//!
//! # Responsibilities
//! - Install a `tracing` subscriber for axum, tower-http and hyper events
//! - Keep those diagnostics on stderr so stdout carries only log records
//!
//! # Design Decisions
//! - Filter from `RUST_LOG`, falling back to the caller's default directives
//! - Application records never go through here unless a logger is built
//!   with [`TracingSink`](super::sink::TracingSink)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter};

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "reqlog=info,tower_http=warn,hyper=warn";

/// Install the global diagnostics subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_diagnostics(default_directives: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
