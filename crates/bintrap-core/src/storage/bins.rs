//! Repository for bin database operations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Bin, BinId},
};

/// Repository for bin rows.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Persists a new bin.
    ///
    /// The primary key enforces token uniqueness; a generated-token
    /// collision surfaces as `CoreError::ConstraintViolation` and the
    /// caller may retry with a fresh token.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails or the token already exists.
    pub async fn create(&self, bin: &Bin) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bins (id, created_at)
            VALUES ($1, $2)
            "#,
        )
        .bind(&bin.id)
        .bind(bin.created_at)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Finds a bin by its token.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(&self, id: &BinId) -> Result<Option<Bin>> {
        let bin = sqlx::query_as::<_, Bin>(
            r#"
            SELECT id, created_at
            FROM bins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(bin)
    }

    /// Lists all bins in creation order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Bin>> {
        let bins = sqlx::query_as::<_, Bin>(
            r#"
            SELECT id, created_at
            FROM bins
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repository_can_be_created() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let _repo = Repository::new(Arc::new(pool));
    }
}
