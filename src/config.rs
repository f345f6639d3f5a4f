//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::gateway::DEFAULT_CAS_ATTEMPTS;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Total compare-and-swap attempts for expiry updates, 0 disables CAS
    pub expire_cas_attempts: u32,
    /// Expiry sweep interval in seconds for the in-memory store
    pub cleanup_interval: u64,
    /// memcached server to front; the in-memory store is used when unset
    pub memcache_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 8080)
    /// - `EXPIRE_CAS_ATTEMPTS` - CAS attempts per expiry update (default: 3)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `MEMCACHE_URL` - e.g. `memcache://127.0.0.1:11211` (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            expire_cas_attempts: parse_var("EXPIRE_CAS_ATTEMPTS")
                .unwrap_or(defaults.expire_cas_attempts),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            memcache_url: env::var("MEMCACHE_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            expire_cas_attempts: DEFAULT_CAS_ATTEMPTS,
            cleanup_interval: 1,
            memcache_url: None,
        }
    }
}
