//! Identifier generation behind an injectable trait.
//!
//! Generation takes a best-effort uniqueness stance: tokens and UUIDs carry
//! enough entropy that collisions are not checked up front, and the storage
//! layer's uniqueness constraints catch the rest. Services receive the
//! generator by injection so tests can pin identifiers deterministically.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::models::{BinId, RequestId};

/// Length of a generated bin token.
///
/// 12 alphanumeric characters is ~71 bits of entropy, comfortably past the
/// point where the primary-key constraint ever fires in practice.
pub const BIN_TOKEN_LEN: usize = 12;

/// Source of new identifiers for bins and captured requests.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Generates a fresh bin token, usable as a URL path segment.
    fn bin_id(&self) -> BinId;

    /// Generates a fresh request identifier.
    fn request_id(&self) -> RequestId;
}

/// Production generator: random alphanumeric tokens and UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl RandomIds {
    /// Creates a new random generator.
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIds {
    fn bin_id(&self) -> BinId {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(BIN_TOKEN_LEN)
            .map(char::from)
            .collect();
        BinId(token)
    }

    fn request_id(&self) -> RequestId {
        RequestId(Uuid::new_v4())
    }
}

/// Deterministic generator for tests.
///
/// Hands out monotonically increasing identifiers so assertions can name
/// the exact bin and request a test expects.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Creates a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn bin_id(&self) -> BinId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        BinId(format!("seqbin{:06}", n))
    }

    fn request_id(&self) -> RequestId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        RequestId(Uuid::from_u128(u128::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn bin_tokens_are_url_safe() {
        let ids = RandomIds::new();
        for _ in 0..100 {
            let token = ids.bin_id();
            assert_eq!(token.as_str().len(), BIN_TOKEN_LEN);
            assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn bin_tokens_are_pairwise_distinct() {
        let ids = RandomIds::new();
        let tokens: HashSet<String> = (0..1000).map(|_| ids.bin_id().0).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn request_ids_are_pairwise_distinct() {
        let ids = RandomIds::new();
        let generated: HashSet<Uuid> = (0..1000).map(|_| ids.request_id().0).collect();
        assert_eq!(generated.len(), 1000);
    }

    #[test]
    fn sequential_ids_are_deterministic() {
        let ids = SequentialIds::new();
        assert_eq!(ids.bin_id().as_str(), "seqbin000000");
        assert_eq!(ids.request_id().0, Uuid::from_u128(1));
        assert_eq!(ids.bin_id().as_str(), "seqbin000002");
    }
}
