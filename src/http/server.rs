//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router and wire limits, timeout and panic recovery
//! - Adapt axum requests into [`ApiRequest`] and buffered responses back
//! - Run the logged API handler for every request
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - A single fallback route: the API does its own dispatch
//! - Handler errors are logged by the middleware and rendered here
//! - The request deadline is enforced by the logging middleware, so a slow
//!   handler still leaves a "Request failed" record. `TimeoutLayer` is only a
//!   backstop a little later, for requests stuck before the handler runs
//!   (slow bodies); those leave no record beyond the 408

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::api::{ApiRoutes, UserStore};
use crate::config::ServerConfig;
use crate::http::middleware::{with_logging, LoggedHandler};
use crate::http::request::{ApiRequest, X_REQUEST_ID};
use crate::http::response::BufferedResponse;
use crate::observability::{Entry, Logger};

/// Extra time the outer timeout allows beyond the handler deadline.
const BACKSTOP_GRACE: Duration = Duration::from_secs(1);

/// Application state injected into the fallback handler.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<LoggedHandler<ApiRoutes>>,
    pub logger: Logger,
    pub max_body_bytes: usize,
}

/// HTTP server for the demo API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    logger: Logger,
}

impl HttpServer {
    pub fn new(config: ServerConfig, logger: Logger) -> Self {
        let routes = ApiRoutes::new(Arc::new(UserStore::new()), config.health_path.clone());
        let api = with_logging(&logger, routes)
            .health_path(config.health_path.clone())
            .timeout(config.request_timeout());

        let state = AppState {
            api: Arc::new(api),
            logger: logger.clone(),
            max_body_bytes: config.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            logger,
        }
    }

    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout() + BACKSTOP_GRACE,
            ))
            .layer(CatchPanicLayer::new())
    }

    /// The configured router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.logger.info(
            Entry::new()
                .with("address", addr.to_string())
                .msg("HTTP server starting"),
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        self.logger.info("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: every request goes through the logged API.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let req = match ApiRequest::from_axum(request, state.max_body_bytes).await {
        Ok(req) => req,
        Err(err) => {
            state.logger.warn(
                Entry::new()
                    .with("error", err.to_string())
                    .msg("Request body rejected"),
            );
            return err.into_response();
        }
    };

    let mut res = BufferedResponse::new();
    match state.api.call(&req, &mut res).await {
        Ok(()) => res.into_response(),
        Err(err) => {
            let mut response = err.into_response();
            if let Some(id) = res.headers().get(X_REQUEST_ID) {
                response.headers_mut().insert(X_REQUEST_ID, HeaderValue::clone(id));
            }
            response
        }
    }
}
