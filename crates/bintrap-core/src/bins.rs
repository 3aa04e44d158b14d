//! Bin lifecycle service.
//!
//! Owns bin identity: token generation, existence checks, and the read
//! side of per-bin counters. No caller-supplied fields means no input
//! validation; the interesting failure modes all live in storage.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tracing::info;

use crate::{
    error::{CoreError, Result},
    ids::IdGenerator,
    models::{Bin, BinId},
    storage::Storage,
};

/// Service for creating and reading bins.
#[derive(Clone)]
pub struct BinService {
    storage: Storage,
    ids: Arc<dyn IdGenerator>,
}

impl BinService {
    /// Creates a new bin service.
    pub fn new(storage: Storage, ids: Arc<dyn IdGenerator>) -> Self {
        Self { storage, ids }
    }

    /// Creates a bin with a freshly generated token and persists it.
    ///
    /// Uniqueness is best-effort at generation time; the storage layer's
    /// primary key turns the improbable collision into
    /// `CoreError::ConstraintViolation`, which callers may retry.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    pub async fn create(&self) -> Result<Bin> {
        let bin = Bin { id: self.ids.bin_id(), created_at: Utc::now() };

        self.storage.bins.create(&bin).await?;
        info!(bin_id = %bin.id, "created bin");

        Ok(bin)
    }

    /// Fetches a bin by its token.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when no such bin exists; this is a
    /// recoverable, user-facing condition.
    pub async fn get(&self, id: &BinId) -> Result<Bin> {
        self.storage
            .bins
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("bin {id} does not exist")))
    }

    /// Lists all bins in creation order.
    ///
    /// Pagination is left to callers wrapping this; the contract is just
    /// ordered retrieval.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(&self) -> Result<Vec<Bin>> {
        self.storage.bins.list_all().await
    }

    /// Fetches the counters recorded for a bin.
    ///
    /// Absent counters are absent from the map, not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn stats(&self, id: &BinId) -> Result<HashMap<String, i64>> {
        self.storage.stats.for_bin(id).await
    }
}
