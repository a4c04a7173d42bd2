//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Per-endpoint cache lifetimes in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTtls {
    /// GET /petitions
    pub petitions: u64,
    /// GET /petitions/:id and GET /petition/:slug
    pub petition: u64,
    /// GET /categories
    pub categories: u64,
    /// GET /users/:user_id/signatures[/ids]
    pub user_signatures: u64,
}

impl Default for EndpointTtls {
    fn default() -> Self {
        Self {
            petitions: 60,
            petition: 60,
            categories: 300,
            user_signatures: 120,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache store can hold
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background purge interval in seconds
    pub cleanup_interval: u64,
    /// Budget for a single cache store call in milliseconds
    pub store_timeout_ms: u64,
    /// Cache lifetimes per endpoint
    pub ttls: EndpointTtls,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 1)
    /// - `STORE_TIMEOUT_MS` - Cache store call budget (default: 250)
    /// - `PETITIONS_TTL`, `PETITION_TTL`, `CATEGORIES_TTL`, `USER_SIGNATURES_TTL` -
    ///   endpoint lifetimes in seconds (defaults: 60, 60, 300, 120)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            store_timeout_ms: env_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            ttls: EndpointTtls {
                petitions: env_or("PETITIONS_TTL", defaults.ttls.petitions),
                petition: env_or("PETITION_TTL", defaults.ttls.petition),
                categories: env_or("CATEGORIES_TTL", defaults.ttls.categories),
                user_signatures: env_or("USER_SIGNATURES_TTL", defaults.ttls.user_signatures),
            },
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            server_port: 3000,
            cleanup_interval: 1,
            store_timeout_ms: 250,
            ttls: EndpointTtls::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
