//! Test harness for bintrap integration tests.
//!
//! Provides per-test PostgreSQL databases, a running API server on an
//! ephemeral port, and fixture helpers for seeding bins and requests.

pub mod database;
pub mod fixtures;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use bintrap_api::AppState;
use bintrap_core::RandomIds;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

/// Test environment with an isolated database and an HTTP client.
pub struct TestEnv {
    /// Pool connected to this test's private database.
    pub db: PgPool,
    /// Client for driving the API end to end.
    pub client: reqwest::Client,
    /// Address of the spawned server, once started.
    pub server_addr: Option<SocketAddr>,
}

impl TestEnv {
    /// Creates a new test environment with a fresh database.
    pub async fn new() -> Result<Self> {
        // Initialize tracing for tests; repeated init attempts are fine.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,bintrap=debug")),
            )
            .with_test_writer()
            .try_init();

        let db = database::setup_test_database().await?;
        let client = reqwest::Client::new();

        Ok(Self { db, client, server_addr: None })
    }

    /// Starts the full API server on an ephemeral port.
    ///
    /// Rendered links use the bound address as base URL, so documents in
    /// end-to-end tests point back at the test server itself.
    pub async fn spawn_server(&mut self) -> Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr().context("Failed to get local addr")?;

        let state =
            AppState::new(self.db.clone(), Arc::new(RandomIds::new()), &format!("http://{addr}"));
        let app = bintrap_api::create_router(state, std::time::Duration::from_secs(30));

        tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                tracing::error!(error = %e, "test server failed");
            }
        });

        self.server_addr = Some(addr);
        Ok(addr)
    }

    /// Returns the base URL for making requests to the test server.
    pub fn base_url(&self) -> String {
        self.server_addr
            .map(|addr| format!("http://{addr}"))
            .unwrap_or_else(|| "http://localhost:8081".to_string())
    }

    /// Executes a lightweight database connectivity check.
    pub async fn database_health_check(&self) -> Result<bool> {
        let result = sqlx::query("SELECT 1 as health").fetch_one(&self.db).await;
        Ok(result.is_ok())
    }
}
