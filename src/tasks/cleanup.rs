//! Expired Entry Purge Task
//!
//! Reads already treat expired entries as absent; this task only reclaims
//! the memory they hold.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that purges expired entries every
/// `cleanup_interval_secs` seconds.
///
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache purge task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("Cache purge: removed {} expired entries", removed);
            } else {
                debug!("Cache purge: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, CacheStore, ManualClock};

    const T0: u64 = 1_700_000_000_000;

    #[tokio::test]
    async fn test_cleanup_task_purges_expired_entries() {
        let clock = Arc::new(ManualClock::new(T0));
        let store = Arc::new(MemoryStore::new(100, clock.clone()));

        store
            .put(CacheEntry::new("petitions:~:short", "[]", T0, 1))
            .await
            .unwrap();
        store
            .put(CacheEntry::new("categories:~:long", "[]", T0, 300))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(2));

        let handle = spawn_cleanup_task(store.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // Checked via len so the lazy path in get is not what removes it
        assert_eq!(store.len().await, 1);
        assert!(store.get("categories:~:long").await.unwrap().is_some());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let clock = Arc::new(ManualClock::new(T0));
        let store = Arc::new(MemoryStore::new(100, clock));

        let handle = spawn_cleanup_task(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
