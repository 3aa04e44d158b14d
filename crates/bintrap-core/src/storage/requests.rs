//! Repository for captured request database operations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{BinId, CapturedRequest, RequestId},
};

/// Repository for captured request rows.
///
/// Rows are written exactly once at capture time and never mutated.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Persists a captured request.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails or constraints are violated.
    pub async fn create(&self, request: &CapturedRequest) -> Result<RequestId> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO requests (
                id, bin_id, method, protocol, user_agent, remote_addr,
                content_length, body, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(request.id)
        .bind(&request.bin_id)
        .bind(&request.method)
        .bind(&request.protocol)
        .bind(&request.user_agent)
        .bind(&request.remote_addr)
        .bind(request.content_length)
        .bind(&request.body)
        .bind(request.created_at)
        .fetch_one(&*self.pool)
        .await?;

        Ok(RequestId(id))
    }

    /// Finds one request scoped to its bin.
    ///
    /// A request belonging to a different bin is treated as absent, so a
    /// guessed ID cannot be read through another bin's URL.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_for_bin(
        &self,
        bin_id: &BinId,
        request_id: RequestId,
    ) -> Result<Option<CapturedRequest>> {
        let request = sqlx::query_as::<_, CapturedRequest>(
            r#"
            SELECT id, bin_id, method, protocol, user_agent, remote_addr,
                   content_length, body, created_at
            FROM requests
            WHERE id = $1 AND bin_id = $2
            "#,
        )
        .bind(request_id)
        .bind(bin_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(request)
    }

    /// Lists all requests captured for a bin, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_for_bin(&self, bin_id: &BinId) -> Result<Vec<CapturedRequest>> {
        let requests = sqlx::query_as::<_, CapturedRequest>(
            r#"
            SELECT id, bin_id, method, protocol, user_agent, remote_addr,
                   content_length, body, created_at
            FROM requests
            WHERE bin_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(bin_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(requests)
    }

    /// Counts all requests captured for a bin.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn count_for_bin(&self, bin_id: &BinId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM requests
            WHERE bin_id = $1
            "#,
        )
        .bind(bin_id)
        .fetch_one(&*self.pool)
        .await?;

        Ok(count.0)
    }
}
