//! Cache Entry Module
//!
//! Defines a stored response payload together with its insertion time and TTL.

// == Cache Entry ==
/// A serialized response payload stored under a cache key.
///
/// The payload is opaque to the store. Expiry is computed from
/// `stored_at_ms` and `ttl_seconds` against whatever clock the caller uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Full cache key
    pub key: String,
    /// Serialized payload (JSON text)
    pub value: String,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at_ms: u64,
    /// Lifetime in seconds
    pub ttl_seconds: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms`.
    pub fn new(key: impl Into<String>, value: impl Into<String>, now_ms: u64, ttl_seconds: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            stored_at_ms: now_ms,
            ttl_seconds,
        }
    }

    // == Expires At ==
    /// Timestamp (Unix milliseconds) at which the entry stops being servable.
    pub fn expires_at_ms(&self) -> u64 {
        self.stored_at_ms
            .saturating_add(self.ttl_seconds.saturating_mul(1000))
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now_ms`.
    ///
    /// Boundary condition: the entry is expired once `now - stored_at >= ttl`,
    /// so an entry read exactly `ttl` seconds after insertion is a miss and an
    /// entry with `ttl_seconds == 0` is never servable.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms()
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms().saturating_sub(now_ms)
    }

    /// Remaining lifetime in whole seconds, rounded up so a live entry never reports `0`.
    pub fn ttl_remaining(&self, now_ms: u64) -> u64 {
        self.ttl_remaining_ms(now_ms).div_ceil(1000)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("petitions:~:GET:%2Fpetitions?", "[]", T0, 60);

        assert_eq!(entry.value, "[]");
        assert_eq!(entry.stored_at_ms, T0);
        assert_eq!(entry.expires_at_ms(), T0 + 60_000);
    }

    #[test]
    fn test_entry_live_before_ttl() {
        let entry = CacheEntry::new("k", "v", T0, 60);

        assert!(!entry.is_expired_at(T0));
        assert!(!entry.is_expired_at(T0 + 59_000));
        assert!(!entry.is_expired_at(T0 + 59_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("k", "v", T0, 60);

        // Exactly ttl seconds after insertion counts as expired
        assert!(entry.is_expired_at(T0 + 60_000));
        assert!(entry.is_expired_at(T0 + 61_000));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new("k", "v", T0, 0);
        assert!(entry.is_expired_at(T0));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("k", "v", T0, 10);

        assert_eq!(entry.ttl_remaining(T0), 10);
        assert_eq!(entry.ttl_remaining(T0 + 9_001), 1);
        assert_eq!(entry.ttl_remaining_ms(T0 + 9_001), 999);
        assert_eq!(entry.ttl_remaining(T0 + 10_000), 0);
        assert_eq!(entry.ttl_remaining(T0 + 20_000), 0);
    }

    #[test]
    fn test_clock_before_insertion() {
        // A clock that reads earlier than the stamp must not underflow
        let entry = CacheEntry::new("k", "v", T0, 1);
        assert!(!entry.is_expired_at(T0 - 5_000));
        assert_eq!(entry.ttl_remaining_ms(T0 - 5_000), 6_000);
    }
}
