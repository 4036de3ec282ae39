//! reqlog demo server
//!
//! Serves a small user API through the request-logging middleware so the
//! record stream (requests, timers, audit events, failures) can be watched
//! on stdout. Framework diagnostics go to stderr via `tracing`.
//!
//! # Startup
//! ```text
//! CLI flags → config file + environment → Logger → bind → serve
//!     SIGINT/SIGTERM → Shutdown → drain → "Shutdown complete"
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use reqlog::config::load_config;
use reqlog::http::HttpServer;
use reqlog::lifecycle::{wait_for_signal, Shutdown};
use reqlog::observability::tracing::{init_diagnostics, DEFAULT_DIRECTIVES};
use reqlog::observability::{Entry, Logger};

#[derive(Parser, Debug)]
#[command(name = "reqlog", version, about = "Demo API with structured request logging")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_diagnostics(DEFAULT_DIRECTIVES)?;

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    let logger = Logger::from_config(&config.logging)?;
    logger.info(
        Entry::new()
            .with("environment", config.logging.environment.as_str())
            .with("bindAddress", config.server.bind_address.as_str())
            .with("threshold", logger.threshold().as_str())
            .msg("Configuration loaded"),
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    logger.info(
        Entry::new()
            .with("address", listener.local_addr()?.to_string())
            .msg("Listening for connections"),
    );

    let shutdown = Shutdown::new();
    let signals = {
        let logger = logger.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = wait_for_signal(&logger, &shutdown).await {
                logger.log_error(&err, Default::default());
                shutdown.trigger();
            }
        })
    };

    let server = HttpServer::new(config.server, logger.component("http"));
    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    logger.info("Shutdown complete");
    Ok(())
}
