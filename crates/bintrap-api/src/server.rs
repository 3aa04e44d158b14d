//! HTTP server configuration and request routing.
//!
//! Axum server setup with the middleware stack and graceful shutdown.
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement
//! 4. CORS handling
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server handles SIGINT and SIGTERM: it stops accepting connections
//! and waits for in-flight requests before returning.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use bintrap_core::{BinService, CaptureService, IdGenerator, Storage};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::handlers;

/// Shared application state handed to every handler.
///
/// Everything is constructed once at startup and injected explicitly; no
/// ambient globals. The pool inside `storage` is the only resource shared
/// between concurrent requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository container.
    pub storage: Storage,
    /// Bin lifecycle service.
    pub bins: Arc<BinService>,
    /// Request capture service.
    pub capture: Arc<CaptureService>,
    base_url: Arc<str>,
}

impl AppState {
    /// Wires storage and services from a pool, an ID source, and the
    /// public base URL used for rendered links.
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>, base_url: &str) -> Self {
        let storage = Storage::new(pool);

        Self {
            bins: Arc::new(BinService::new(storage.clone(), ids.clone())),
            capture: Arc::new(CaptureService::new(storage.clone(), ids)),
            storage,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Public base URL for rendered links, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check));

    let api_routes = Router::new()
        .route("/", get(handlers::get_root))
        .route("/bins", post(handlers::create_bin).get(handlers::list_bins))
        .route("/bins/{id}", get(handlers::get_bin))
        .route("/bins/{id}/request", any(handlers::capture_request))
        .route("/bins/{id}/requests", get(handlers::list_requests))
        .route("/bins/{id}/requests/{request_id}", get(handlers::get_request));

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject a request ID into all responses.
///
/// Adds an `X-Request-Id` header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the given address and serves requests until a shutdown signal
/// arrives. Connection info is attached so captures can record the peer
/// address.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is in use or the interface is
/// unavailable.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let app = create_router(state, request_timeout);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}

#[cfg(test)]
mod tests {
    use bintrap_core::RandomIds;

    use super::*;

    #[tokio::test]
    async fn app_state_trims_base_url() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let state = AppState::new(pool, Arc::new(RandomIds::new()), "https://api.example.com/");

        assert_eq!(state.base_url(), "https://api.example.com");
    }

    #[tokio::test]
    async fn router_can_be_built() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let state = AppState::new(pool, Arc::new(RandomIds::new()), "http://127.0.0.1:8081");

        let _router = create_router(state, Duration::from_secs(30));
    }
}
