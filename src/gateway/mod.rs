//! Cache Gateway Module
//!
//! Validated get/set/expire on top of a [`CacheStore`]. The gateway holds no
//! mutable state and is shared across all request tasks.
//!
//! `expire` is a read-modify-write: it reads the current item and writes it
//! back with a new expiration. When the store offers compare-and-swap the
//! write is conditional and retried a bounded number of times on conflict.
//! Otherwise a concurrent write to the same key between the read and the
//! write can be lost.

#[cfg(test)]
mod property_tests;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, Result};
use crate::models::{ExpireRequest, GetRequest, SetRequest};
use crate::store::{CacheItem, CacheStore, CasOutcome, StoreError};

/// Compare-and-swap attempts for `expire` unless configured otherwise
pub const DEFAULT_CAS_ATTEMPTS: u32 = 3;

// == Cache Gateway ==
#[derive(Clone)]
pub struct CacheGateway {
    store: Arc<dyn CacheStore>,
    /// Total conditional-write attempts for `expire`; 0 disables CAS
    cas_attempts: u32,
}

impl CacheGateway {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            cas_attempts: DEFAULT_CAS_ATTEMPTS,
        }
    }

    pub fn with_cas_attempts(mut self, cas_attempts: u32) -> Self {
        self.cas_attempts = cas_attempts;
        self
    }

    // == Get ==
    /// Returns the stored value for the key.
    pub async fn get(&self, req: GetRequest) -> Result<Bytes> {
        reject_invalid("get", &req.key, req.validate())?;
        info!(op = "get", key = %req.key, "Getting key");

        let item = self.lookup("get", &req.key).await?;
        debug!(
            op = "get",
            key = %req.key,
            value = %String::from_utf8_lossy(&item.value),
            "Cache hit"
        );
        Ok(item.value)
    }

    // == Set ==
    /// Overwrites the key with the new value and no expiration.
    pub async fn set(&self, req: SetRequest) -> Result<()> {
        reject_invalid("set", &req.key, req.validate())?;
        info!(op = "set", key = %req.key, "Setting key");
        debug!(op = "set", key = %req.key, value = %req.value, "New value");

        let SetRequest { key, value } = req;
        self.store
            .set(CacheItem::new(key.clone(), value))
            .await
            .map_err(|err| store_failure("set", &key, err))
    }

    // == Expire ==
    /// Changes the expiration of an existing key, keeping its value.
    ///
    /// Never creates an item: an absent key is `NotFound` and nothing is
    /// written.
    pub async fn expire(&self, req: ExpireRequest) -> Result<()> {
        reject_invalid("expire", &req.key, req.validate())?;
        info!(
            op = "expire",
            key = %req.key,
            expiration = req.expiration,
            "Changing expiry"
        );

        let expiration = expiration_from_secs(req.expiration);

        if self.cas_attempts == 0 || !self.store.supports_cas() {
            let current = self.lookup("expire", &req.key).await?;
            return self
                .store
                .set(current.with_expiration(expiration))
                .await
                .map_err(|err| store_failure("expire", &req.key, err));
        }

        for attempt in 1..=self.cas_attempts {
            let current = self.lookup("expire", &req.key).await?;

            match self
                .store
                .compare_and_swap(current.with_expiration(expiration))
                .await
            {
                Ok(CasOutcome::Stored) => return Ok(()),
                Ok(CasOutcome::NotFound) => {
                    info!(op = "expire", key = %req.key, "Item vanished before expiry update");
                    return Err(GatewayError::NotFound(req.key));
                }
                Ok(CasOutcome::Conflict) => {
                    warn!(op = "expire", key = %req.key, attempt, "Concurrent write during expiry update");
                }
                Err(err) => return Err(store_failure("expire", &req.key, err)),
            }
        }

        warn!(
            op = "expire",
            key = %req.key,
            attempts = self.cas_attempts,
            "Giving up on expiry update"
        );
        Err(GatewayError::Conflict {
            key: req.key,
            attempts: self.cas_attempts,
        })
    }

    async fn lookup(&self, op: &'static str, key: &str) -> Result<CacheItem> {
        match self.store.get(key).await {
            Ok(Some(item)) => Ok(item),
            Ok(None) => {
                info!(op, key, "Cache miss");
                Err(GatewayError::NotFound(key.to_string()))
            }
            Err(err) => Err(store_failure(op, key, err)),
        }
    }
}

/// 0 means no expiration.
fn expiration_from_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn reject_invalid(op: &'static str, key: &str, problem: Option<String>) -> Result<()> {
    match problem {
        Some(reason) => {
            warn!(op, key, reason = %reason, "Rejecting invalid request");
            Err(GatewayError::InvalidRequest(reason))
        }
        None => Ok(()),
    }
}

fn store_failure(op: &'static str, key: &str, err: StoreError) -> GatewayError {
    error!(op, key, error = %err, "Store operation failed");
    GatewayError::Store(err)
}
