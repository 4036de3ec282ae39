//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or SIGTERM
//! - Record which signal arrived
//! - Trigger graceful shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGTERM is only watched on Unix

use std::io;

use crate::lifecycle::Shutdown;
use crate::observability::{Entry, Logger};

/// Block until a termination signal arrives, then trigger `shutdown`.
pub async fn wait_for_signal(logger: &Logger, shutdown: &Shutdown) -> io::Result<()> {
    let signal = recv_signal().await?;
    logger.info(
        Entry::new()
            .with("signal", signal)
            .msg("Shutdown signal received"),
    );
    shutdown.trigger();
    Ok(())
}

#[cfg(unix)]
async fn recv_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn recv_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "SIGINT")
}
