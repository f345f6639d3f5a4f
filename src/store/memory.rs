//! Memory Store Module
//!
//! In-process `CacheStore` with per-item expiration and CAS tokens.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheItem, CacheStore, CasOutcome, StoreError, StoredEntry};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, StoredEntry>,
    /// Last token handed out; bumped on every write
    last_cas: u64,
}

impl Inner {
    fn write(&mut self, item: CacheItem) {
        self.last_cas += 1;
        let entry = StoredEntry::new(item.value, item.expiration, self.last_cas);
        self.entries.insert(item.key, entry);
    }

    fn live_entry(&self, key: &str) -> Option<&StoredEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }
}

// == Memory Store ==
/// Key/value storage held in process memory.
///
/// Expired entries read as misses and are removed by `purge_expired`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - inner.entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.live_entry(key).map(|entry| CacheItem {
            key: key.to_string(),
            value: entry.value.clone(),
            expiration: entry.ttl_remaining(),
            cas: Some(entry.cas),
        }))
    }

    async fn set(&self, item: CacheItem) -> Result<(), StoreError> {
        self.inner.write().await.write(item);
        Ok(())
    }

    fn supports_cas(&self) -> bool {
        true
    }

    async fn compare_and_swap(&self, item: CacheItem) -> Result<CasOutcome, StoreError> {
        let expected = item.cas.ok_or(StoreError::MissingCasToken)?;
        let mut inner = self.inner.write().await;

        let current = match inner.live_entry(&item.key) {
            Some(entry) => entry.cas,
            None => return Ok(CasOutcome::NotFound),
        };
        if current != expected {
            return Ok(CasOutcome::Conflict);
        }

        inner.write(item);
        Ok(CasOutcome::Stored)
    }
}
