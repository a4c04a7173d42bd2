//! Invalidation Module
//!
//! Deletes every cached entry under a key prefix after a write.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::store::bounded;
use crate::cache::{CachePrefix, CacheStats, CacheStore};

// == Invalidation Broadcaster ==
/// Prefix invalidation over a shared [`CacheStore`].
///
/// Deletes are independent: a failed delete is logged and skipped, and the
/// lingering entry still expires on its own TTL. Callers await
/// [`InvalidationBroadcaster::invalidate_prefix`] before answering the write
/// that triggered it.
pub struct InvalidationBroadcaster {
    store: Arc<dyn CacheStore>,
    stats: Arc<CacheStats>,
    store_timeout: Duration,
}

impl InvalidationBroadcaster {
    pub fn new(store: Arc<dyn CacheStore>, stats: Arc<CacheStats>, store_timeout: Duration) -> Self {
        Self {
            store,
            stats,
            store_timeout,
        }
    }

    // == Invalidate Prefix ==
    /// Deletes all live keys starting with `prefix`.
    ///
    /// Returns how many were deleted. The count is informational; an empty
    /// prefix match is not an error.
    pub async fn invalidate_prefix(&self, prefix: &CachePrefix) -> usize {
        let scan = self.store.keys_with_prefix(prefix.as_str());
        let keys = match bounded(self.store_timeout, scan).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(prefix = %prefix, error = %err, "Cache invalidation scan failed");
                self.stats.record_store_error();
                return 0;
            }
        };

        let mut deleted = 0;
        for key in &keys {
            match bounded(self.store_timeout, self.store.delete(key)).await {
                Ok(true) => deleted += 1,
                // Expired and purged in between
                Ok(false) => {}
                Err(err) => {
                    warn!(key = %key, error = %err, "Cache invalidation delete failed");
                    self.stats.record_store_error();
                }
            }
        }

        self.stats.record_invalidated(deleted);
        if deleted > 0 {
            info!(prefix = %prefix, deleted, matched = keys.len(), "Cache invalidated");
        } else {
            debug!(prefix = %prefix, "Cache invalidation matched nothing");
        }
        deleted
    }

    /// Invalidates several prefixes in order; returns the total deleted.
    pub async fn invalidate_all(&self, prefixes: &[CachePrefix]) -> usize {
        let mut total = 0;
        for prefix in prefixes {
            total += self.invalidate_prefix(prefix).await;
        }
        total
    }
}
