//! Memory Store Module
//!
//! In-process [`CacheStore`] backend: HashMap storage with LRU capacity
//! eviction and lazy TTL expiry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{
    CacheEntry, CacheStore, Clock, RecencyIndex, StoreUsage, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    recency: RecencyIndex,
    evictions: u64,
}

impl Inner {
    fn remove(&mut self, key: &str) -> bool {
        self.recency.remove(key);
        self.entries.remove(key).is_some()
    }
}

// == Memory Store ==
/// Bounded in-memory cache store.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries.
    pub fn new(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
            max_entries: max_entries.max(1),
        }
    }

    // == Purge Expired ==
    /// Physically removes expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.inner.write().await;

        let expired: Vec<String> = inner
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }
        expired.len()
    }

    /// Current number of entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Number of entries dropped to make room for new ones.
    pub async fn evictions(&self) -> u64 {
        self.inner.read().await.evictions
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    // == Get ==
    /// Expired entries are removed on sight and reported as absent.
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.write().await;

        let expired = match inner.entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            inner.remove(key);
            return Ok(None);
        }

        inner.recency.touch(key);
        Ok(inner.entries.get(key).cloned())
    }

    // == Put ==
    /// Overwrites in place; evicts the least recently used entry when full.
    async fn put(&self, entry: CacheEntry) -> StoreResult<()> {
        if entry.key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::Rejected(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if entry.value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::Rejected(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let mut inner = self.inner.write().await;

        if !inner.entries.contains_key(&entry.key) && inner.entries.len() >= self.max_entries {
            match inner.recency.evict_oldest() {
                Some(evicted) => {
                    inner.entries.remove(&evicted);
                    inner.evictions += 1;
                }
                None => {
                    return Err(StoreError::Unavailable(
                        "store is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        inner.recency.touch(&entry.key);
        inner.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.remove(key))
    }

    // == Prefix Scan ==
    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let now = self.clock.now_ms();
        let inner = self.inner.read().await;

        let mut keys: Vec<String> = inner
            .entries
            .values()
            .filter(|entry| entry.key.starts_with(prefix) && !entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn usage(&self) -> StoreResult<StoreUsage> {
        let inner = self.inner.read().await;
        Ok(StoreUsage {
            entries: inner.entries.len(),
            evictions: inner.evictions,
        })
    }
}
