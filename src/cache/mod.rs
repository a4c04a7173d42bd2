//! Cache Module
//!
//! Response caching for the read-heavy petition endpoints: request-derived
//! keys, a TTL store, read-through response handling and prefix invalidation.

mod clock;
mod entry;
mod invalidation;
mod key;
mod memory;
mod recency;
mod response_cache;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use invalidation::InvalidationBroadcaster;
pub use key::{CacheKey, CacheNamespace, CachePrefix, CacheRequest};
pub use memory::MemoryStore;
pub use recency::RecencyIndex;
pub use response_cache::ResponseCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStore, StoreUsage};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
