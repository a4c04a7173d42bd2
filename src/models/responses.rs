//! Response DTOs for the petition API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for GET /users/:user_id/signatures/ids
#[derive(Debug, Clone, Serialize)]
pub struct SignatureIdsResponse {
    pub user_id: String,
    /// Ids of the petitions this user signed
    pub petition_ids: Vec<u64>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub bypasses: u64,
    pub stores: u64,
    pub store_errors: u64,
    pub invalidated: u64,
    /// Entries evicted for capacity
    pub evictions: u64,
    /// Entries currently held by the store
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from counters and store figures
    pub fn new(snapshot: StatsSnapshot, evictions: u64, total_entries: usize) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            bypasses: snapshot.bypasses,
            stores: snapshot.stores,
            store_errors: snapshot.store_errors,
            invalidated: snapshot.invalidated,
            evictions,
            total_entries,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
