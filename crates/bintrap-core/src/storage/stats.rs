//! Repository for per-bin counters.

use std::{collections::HashMap, sync::Arc};

use sqlx::PgPool;

use crate::{error::Result, models::BinId};

/// Repository for the `bin_stats` counter table.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Durably increases a named counter for a bin by one.
    ///
    /// A single atomic upsert: concurrent captures against the same bin
    /// serialize at the storage layer, never as a service-side
    /// read-modify-write across round trips.
    ///
    /// # Errors
    ///
    /// Returns error if the upsert fails. Callers distinguish this from a
    /// capture failure; the captured row is already durable at this point.
    pub async fn increment(&self, bin_id: &BinId, counter: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bin_stats (bin_id, counter, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (bin_id, counter)
            DO UPDATE SET value = bin_stats.value + 1
            "#,
        )
        .bind(bin_id)
        .bind(counter)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Fetches all counters for a bin.
    ///
    /// Counters that have never been incremented are simply absent from the
    /// map; consumers default them to zero rather than treating absence as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn for_bin(&self, bin_id: &BinId) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT counter, value FROM bin_stats
            WHERE bin_id = $1
            "#,
        )
        .bind(bin_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
