//! Response Cache Module
//!
//! Read-through cache in front of request handlers. GET responses are looked
//! up by [`CacheKey`], computed on a miss and stored with the caller's TTL.
//! The store is best effort: any failure or timeout degrades to computing
//! the response directly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::store::bounded;
use crate::cache::{CacheEntry, CacheKey, CacheRequest, CacheStats, CacheStore, Clock};
use crate::error::ApiError;
use crate::response::{build_error_response, json_payload_response, CacheStatus};

// == Response Cache ==
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    stats: Arc<CacheStats>,
    /// Upper bound for a single store call
    store_timeout: Duration,
}

enum Lookup {
    Hit(CacheEntry),
    Miss,
    Degraded,
}

impl ResponseCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        stats: Arc<CacheStats>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            stats,
            store_timeout,
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Handle ==
    /// Serves `request` from the cache or from `compute_fresh`.
    ///
    /// - non-GET: `compute_fresh` runs and its result is returned untouched (`BYPASS`)
    /// - hit: stored payload with `X-Cache: HIT` and the remaining TTL
    /// - miss: payload computed, stored for `ttl_seconds`, returned with `X-Cache: MISS`
    /// - error from `compute_fresh`: nothing stored, error response with `BYPASS`
    ///
    /// A TTL of zero computes without storing.
    pub async fn handle<T, F, Fut>(
        &self,
        request: &CacheRequest,
        ttl_seconds: u64,
        compute_fresh: F,
    ) -> Response
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !request.is_cacheable() {
            self.stats.record_bypass();
            return fresh_response(compute_fresh().await, CacheStatus::Bypass, None);
        }

        let key = CacheKey::for_request(request);

        let degraded = match self.lookup(&key).await {
            Lookup::Hit(entry) => {
                let remaining = entry.ttl_remaining(self.clock.now_ms());
                debug!(key = %key, remaining, "Cache hit");
                self.stats.record_hit();
                return json_payload_response(
                    StatusCode::OK,
                    entry.value,
                    CacheStatus::Hit,
                    Some(remaining),
                );
            }
            Lookup::Miss => {
                debug!(key = %key, "Cache miss");
                self.stats.record_miss();
                false
            }
            Lookup::Degraded => true,
        };

        let payload = match serialize_payload(compute_fresh().await) {
            Ok(payload) => payload,
            Err(err) => {
                self.stats.record_bypass();
                return build_error_response(err, StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        if degraded || ttl_seconds == 0 {
            self.stats.record_bypass();
            return json_payload_response(StatusCode::OK, payload, CacheStatus::Bypass, None);
        }

        let entry = CacheEntry::new(
            key.as_str(),
            payload.clone(),
            self.clock.now_ms(),
            ttl_seconds,
        );
        match bounded(self.store_timeout, self.store.put(entry)).await {
            Ok(()) => {
                self.stats.record_store();
                json_payload_response(StatusCode::OK, payload, CacheStatus::Miss, Some(ttl_seconds))
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Cache write failed, serving uncached");
                self.stats.record_store_error();
                json_payload_response(StatusCode::OK, payload, CacheStatus::Bypass, None)
            }
        }
    }

    // == Lookup ==
    async fn lookup(&self, key: &CacheKey) -> Lookup {
        match bounded(self.store_timeout, self.store.get(key.as_str())).await {
            // The store should never hand out expired entries; check anyway
            Ok(Some(entry)) if !entry.is_expired_at(self.clock.now_ms()) => Lookup::Hit(entry),
            Ok(_) => Lookup::Miss,
            Err(err) => {
                warn!(key = %key, error = %err, "Cache read failed, computing directly");
                self.stats.record_store_error();
                Lookup::Degraded
            }
        }
    }
}

/// Converts a computed result into a response without touching the store.
fn fresh_response<T: Serialize>(
    result: Result<T, ApiError>,
    cache_status: CacheStatus,
    ttl_seconds: Option<u64>,
) -> Response {
    match serialize_payload(result) {
        Ok(payload) => json_payload_response(StatusCode::OK, payload, cache_status, ttl_seconds),
        Err(err) => build_error_response(err, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn serialize_payload<T: Serialize>(result: Result<T, ApiError>) -> Result<String, ApiError> {
    let value = result?;
    Ok(serde_json::to_string(&value)?)
}
