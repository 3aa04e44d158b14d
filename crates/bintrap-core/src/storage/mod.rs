//! Database access layer implementing the repository pattern.
//!
//! The repository layer translates between domain models and the relational
//! schema. All database operations MUST go through these repositories;
//! direct SQL outside this module is forbidden to keep the schema contained.

use std::sync::Arc;

use sqlx::PgPool;

pub mod bins;
pub mod requests;
pub mod stats;

use crate::error::Result;

/// Name of the per-bin counter incremented on every successful capture.
pub const REQUESTS_COUNTER: &str = "requests";

/// Container for all repository instances providing unified database access.
///
/// The single entry point for persistence. Repositories share one
/// connection pool, which is also the only resource shared between
/// concurrent capture operations.
#[derive(Clone)]
pub struct Storage {
    /// Repository for bin rows.
    pub bins: Arc<bins::Repository>,

    /// Repository for captured request rows.
    pub requests: Arc<requests::Repository>,

    /// Repository for per-bin counters.
    pub stats: Arc<stats::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self {
            bins: Arc::new(bins::Repository::new(pool.clone())),
            requests: Arc::new(requests::Repository::new(pool.clone())),
            stats: Arc::new(stats::Repository::new(pool)),
        }
    }

    /// Performs a health check on the database connection.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.bins.pool()).await?;

        Ok(())
    }
}

/// Creates the tables and indexes the service needs, if absent.
///
/// Run once at process startup and by the test harness when provisioning a
/// fresh database. Not a migration system; the schema has no versioned
/// history to replay.
///
/// # Errors
///
/// Returns `CoreError::Database` if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bins (
            id TEXT PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS requests (
            id UUID PRIMARY KEY,
            bin_id TEXT NOT NULL,
            method TEXT NOT NULL,
            protocol TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            remote_addr TEXT NOT NULL,
            content_length BIGINT NOT NULL,
            body TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bin_stats (
            bin_id TEXT NOT NULL,
            counter TEXT NOT NULL,
            value BIGINT NOT NULL DEFAULT 0,
            PRIMARY KEY (bin_id, counter)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_requests_bin
        ON requests(bin_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_can_be_created() {
        // Instantiation only; behavior is covered by integration tests.
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let _storage = Storage::new(pool);
    }
}
