//! Cache Store Module
//!
//! The key-value contract the response cache talks to.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::cache::CacheEntry;
use crate::error::{StoreError, StoreResult};

// == Store Usage ==
/// Occupancy figures reported by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreUsage {
    /// Entries physically held, expired ones included until purged
    pub entries: usize,
    /// Entries dropped to make room for new ones
    pub evictions: u64,
}

// == Cache Store Trait ==
/// Key-value store with per-entry TTL and prefix enumeration.
///
/// Implementations may keep expired entries around physically but must never
/// return one from [`CacheStore::get`] or list it from
/// [`CacheStore::keys_with_prefix`]. Concurrent writers to one key race and
/// the last write wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live entry stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>>;

    /// Inserts or overwrites the entry under `entry.key`.
    async fn put(&self, entry: CacheEntry) -> StoreResult<()>;

    /// Deletes `key`; returns whether an entry was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Lists live keys starting with the literal `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Occupancy figures; backends that cannot tell report zeros.
    async fn usage(&self) -> StoreResult<StoreUsage> {
        Ok(StoreUsage::default())
    }
}

/// Runs a store call under the `limit` budget; an overrun becomes
/// [`StoreError::Timeout`].
pub(crate) async fn bounded<R>(
    limit: Duration,
    call: impl Future<Output = StoreResult<R>>,
) -> StoreResult<R> {
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_millis(50), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: StoreResult<()> =
            bounded(Duration::from_millis(20), std::future::pending()).await;
        assert_eq!(result, Err(StoreError::Timeout(20)));
    }
}
