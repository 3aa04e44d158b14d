//! Fixture helpers for seeding test data directly through SQL.

use anyhow::{Context, Result};
use bintrap_core::models::{BinId, RequestId};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Inserts a bin row with the given token and returns its ID.
pub async fn insert_bin(pool: &PgPool, token: &str) -> Result<BinId> {
    sqlx::query("INSERT INTO bins (id, created_at) VALUES ($1, $2)")
        .bind(token)
        .bind(Utc::now())
        .execute(pool)
        .await
        .context("Failed to insert test bin")?;

    Ok(BinId::from(token))
}

/// Inserts a captured request row for a bin and returns its ID.
pub async fn insert_request(pool: &PgPool, bin_id: &BinId, body: &str) -> Result<RequestId> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO requests (
            id, bin_id, method, protocol, user_agent, remote_addr,
            content_length, body, created_at
        ) VALUES ($1, $2, 'POST', 'HTTP/1.1', 'test-harness', '127.0.0.1:9', $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(bin_id.as_str())
    .bind(body.len() as i64)
    .bind(body)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to insert test request")?;

    Ok(RequestId(id))
}

/// Counts the request rows stored for a bin.
pub async fn count_requests(pool: &PgPool, bin_id: &BinId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE bin_id = $1")
        .bind(bin_id.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count test requests")?;

    Ok(count)
}

/// Reads the value of one counter for a bin, zero when absent.
pub async fn counter_value(pool: &PgPool, bin_id: &BinId, counter: &str) -> Result<i64> {
    let value: Option<i64> =
        sqlx::query_scalar("SELECT value FROM bin_stats WHERE bin_id = $1 AND counter = $2")
            .bind(bin_id.as_str())
            .bind(counter)
            .fetch_optional(pool)
            .await
            .context("Failed to read test counter")?;

    Ok(value.unwrap_or(0))
}
