//! Memcache Gateway - HTTP front-end for a key/value cache
//!
//! Accepts JSON requests to get, set and change the expiration of cached
//! values, delegating storage to a pluggable cache store.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use gateway::CacheGateway;
pub use store::{CacheStore, MemcachedStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
