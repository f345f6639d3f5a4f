//! Stored Entry Module
//!
//! Per-key record kept by the in-memory store.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Stored Entry ==
/// A value with its optional deadline and CAS token.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub value: Bytes,
    /// Instant after which the entry is gone, None = no expiration
    pub expires_at: Option<Instant>,
    pub cas: u64,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates an entry expiring `expiration` from now.
    ///
    /// A zero duration is treated like `None`, matching memcached. A deadline
    /// past what `Instant` can represent also never expires.
    pub fn new(value: Bytes, expiration: Option<Duration>, cas: u64) -> Self {
        let expires_at = expiration
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl));

        Self {
            value,
            expires_at,
            cas,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining lifetime, or None if the entry never expires.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
