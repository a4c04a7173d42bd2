//! Petition Cache - response caching for a read-heavy petition API
//!
//! Request-derived cache keys, TTL-bounded read-through responses, prefix
//! invalidation after writes and uniform JSON errors.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod response;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{ApiError, ApiResult, StoreError};
pub use tasks::spawn_cleanup_task;
