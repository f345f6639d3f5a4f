//! Memcached-backed store.
//!
//! Wraps the blocking `memcache` client. Every call runs on the blocking
//! thread pool so request tasks never stall the runtime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memcache::{Client, MemcacheError};
use tracing::info;

use super::{CacheItem, CacheStore, CasOutcome, StoreError};

/// Longest expiry memcached reads as relative seconds. Larger values are
/// taken as absolute unix timestamps.
const RELATIVE_EXPIRY_LIMIT: u64 = 60 * 60 * 24 * 30;

/// Value, flags and cas token as returned by `gets`.
type Hit = (Vec<u8>, u32, Option<u64>);

#[derive(Clone)]
pub struct MemcachedStore {
    client: Arc<Client>,
}

impl MemcachedStore {
    /// Connects to `url`, e.g. `memcache://127.0.0.1:11211`.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(url)?;
        info!(url, "Connected to memcached");
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> Result<T, MemcacheError> + Send + 'static,
    {
        let client = self.client.clone();
        tokio::task::spawn_blocking(move || op(&client))
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl CacheStore for MemcachedStore {
    async fn get(&self, key: &str) -> Result<Option<CacheItem>, StoreError> {
        let key = key.to_owned();
        self.run(move |client| {
            let mut hits: HashMap<String, Hit> = client.gets(&[key.as_str()])?;
            Ok(hits.remove(&key).map(|(value, _flags, cas)| CacheItem {
                cas,
                ..CacheItem::new(key, value)
            }))
        })
        .await
    }

    async fn set(&self, item: CacheItem) -> Result<(), StoreError> {
        let exptime = exptime(item.expiration, chrono::Utc::now().timestamp());
        self.run(move |client| client.set(&item.key, &item.value[..], exptime))
            .await
    }

    fn supports_cas(&self) -> bool {
        true
    }

    async fn compare_and_swap(&self, item: CacheItem) -> Result<CasOutcome, StoreError> {
        let token = item.cas.ok_or(StoreError::MissingCasToken)?;
        let exptime = exptime(item.expiration, chrono::Utc::now().timestamp());
        self.run(move |client| {
            match client.cas(&item.key, &item.value[..], exptime, token) {
                Ok(true) => return Ok(CasOutcome::Stored),
                // EXISTS and NOT_FOUND both land here; a fresh read tells them apart
                Ok(false) | Err(MemcacheError::CommandError(_)) => {}
                Err(err) => return Err(err),
            }

            let hits: HashMap<String, Hit> = client.gets(&[item.key.as_str()])?;
            Ok(if hits.contains_key(&item.key) {
                CasOutcome::Conflict
            } else {
                CasOutcome::NotFound
            })
        })
        .await
    }
}

impl From<MemcacheError> for StoreError {
    fn from(err: MemcacheError) -> Self {
        match err {
            MemcacheError::IOError(_) | MemcacheError::PoolError(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Memcached expiry field for `expiration`, 0 meaning never.
///
/// Partial seconds round up. Past the relative limit the deadline is sent as
/// a unix timestamp, saturating at the largest one the protocol carries.
fn exptime(expiration: Option<Duration>, now_unix: i64) -> u32 {
    let Some(ttl) = expiration else {
        return 0;
    };
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));

    if secs <= RELATIVE_EXPIRY_LIMIT {
        return u32::try_from(secs).unwrap_or(u32::MAX);
    }

    let now = u64::try_from(now_unix).unwrap_or(0);
    u32::try_from(now.saturating_add(secs)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_exptime_never_expires() {
        assert_eq!(exptime(None, NOW), 0);
    }

    #[test]
    fn test_exptime_relative_seconds() {
        assert_eq!(exptime(Some(Duration::from_secs(30)), NOW), 30);
        assert_eq!(exptime(Some(Duration::from_millis(1500)), NOW), 2);
        assert_eq!(
            exptime(Some(Duration::from_secs(RELATIVE_EXPIRY_LIMIT)), NOW),
            RELATIVE_EXPIRY_LIMIT as u32
        );
    }

    #[test]
    fn test_exptime_long_ttl_is_absolute() {
        let secs = RELATIVE_EXPIRY_LIMIT + 1;
        assert_eq!(
            exptime(Some(Duration::from_secs(secs)), NOW),
            (NOW as u64 + secs) as u32
        );
    }

    #[test]
    fn test_exptime_saturates() {
        assert_eq!(exptime(Some(Duration::from_secs(i64::MAX as u64)), NOW), u32::MAX);
        assert_eq!(exptime(Some(Duration::MAX), NOW), u32::MAX);
    }

    #[test]
    fn test_io_error_is_unavailable() {
        let err = MemcacheError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_bad_url_is_backend_error() {
        let err = MemcacheError::BadURL("nowhere".into());
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        assert!(MemcachedStore::connect("not a url").is_err());
    }

    // Runs against a live server only when MEMCACHE_TEST_URL is set.
    #[tokio::test]
    async fn test_live_get_set_cas() {
        let Ok(url) = std::env::var("MEMCACHE_TEST_URL") else {
            return;
        };
        let store = MemcachedStore::connect(&url).unwrap();
        let key = format!("gateway-test-{}", std::process::id());

        store.set(CacheItem::new(key.clone(), "v1")).await.unwrap();
        let item = store.get(&key).await.unwrap().unwrap();
        assert_eq!(&item.value[..], b"v1");
        assert!(item.cas.is_some());

        let updated = item.clone().with_expiration(Some(Duration::from_secs(60)));
        assert_eq!(
            store.compare_and_swap(updated.clone()).await.unwrap(),
            CasOutcome::Stored
        );
        assert_eq!(
            store.compare_and_swap(updated).await.unwrap(),
            CasOutcome::Conflict
        );

        let missing = CacheItem {
            cas: Some(1),
            ..CacheItem::new(format!("{key}-missing"), "v")
        };
        assert_eq!(
            store.compare_and_swap(missing).await.unwrap(),
            CasOutcome::NotFound
        );
        assert!(store.get(&format!("{key}-missing")).await.unwrap().is_none());
    }
}
