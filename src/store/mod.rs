//! Store Module
//!
//! Narrow interface over the key/value cache the gateway delegates to, with a
//! memcached client and an in-process implementation used by default and in
//! the tests.

mod entry;
mod memcached;
mod memory;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use entry::StoredEntry;
pub use memcached::MemcachedStore;
pub use memory::MemoryStore;

// == Public Constants ==
/// Maximum allowed key length in bytes (memcached limit)
pub const MAX_KEY_LENGTH: usize = 250;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Cache Item ==
/// A transient copy of one cached item.
///
/// `cas` is the version token handed out by stores that support conditional
/// writes. Items built for an unconditional `set` leave it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    pub key: String,
    pub value: Bytes,
    /// `None` means the item never expires
    pub expiration: Option<Duration>,
    pub cas: Option<u64>,
}

impl CacheItem {
    /// Creates an item with no expiration and no CAS token.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expiration: None,
            cas: None,
        }
    }

    /// Returns the same item with its expiration replaced.
    pub fn with_expiration(self, expiration: Option<Duration>) -> Self {
        Self { expiration, ..self }
    }
}

// == CAS Outcome ==
/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// Token matched, item written
    Stored,
    /// Item was modified since it was read
    Conflict,
    /// Item no longer exists
    NotFound,
}

// == Store Error ==
#[derive(Error, Debug)]
pub enum StoreError {
    /// The cache service could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The cache service answered with an unexpected error
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("compare-and-swap requires a cas token from a prior get")]
    MissingCasToken,

    #[error("store does not support compare-and-swap")]
    Unsupported,
}

// == Cache Store Trait ==
/// Operations the gateway needs from the underlying cache.
///
/// Implementations serialize operations on the same key. No ordering is
/// assumed across keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Looks up a key. A miss is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<CacheItem>, StoreError>;

    /// Writes the full item, replacing any previous one.
    async fn set(&self, item: CacheItem) -> Result<(), StoreError>;

    /// Whether `compare_and_swap` is available.
    fn supports_cas(&self) -> bool {
        false
    }

    /// Writes `item` only if the stored token still equals `item.cas`.
    async fn compare_and_swap(&self, _item: CacheItem) -> Result<CasOutcome, StoreError> {
        Err(StoreError::Unsupported)
    }
}
