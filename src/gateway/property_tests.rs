//! Property-Based Tests for the gateway
//!
//! Drives the gateway over a `MemoryStore` with proptest-generated keys and values.

use std::sync::Arc;

use bytes::Bytes;
use proptest::prelude::*;

use crate::error::GatewayError;
use crate::gateway::CacheGateway;
use crate::models::{ExpireRequest, GetRequest, SetRequest};
use crate::store::MemoryStore;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:.-]{1,64}"
}

/// Generates arbitrary printable values, empty included
fn value_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,128}"
}

fn new_gateway() -> CacheGateway {
    CacheGateway::new(Arc::new(MemoryStore::new()))
}

fn set_req(key: &str, value: &str) -> SetRequest {
    SetRequest {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn get_req(key: &str) -> GetRequest {
    GetRequest {
        key: key.to_string(),
    }
}

fn expire_req(key: &str, expiration: i64) -> ExpireRequest {
    ExpireRequest {
        key: key.to_string(),
        expiration,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Set followed by Get returns the stored value unchanged.
    #[test]
    fn prop_set_then_get_roundtrip(key in valid_key_strategy(), value in value_strategy()) {
        let gateway = new_gateway();

        let result = tokio_test::block_on(async {
            gateway.set(set_req(&key, &value)).await?;
            gateway.get(get_req(&key)).await
        });

        prop_assert_eq!(result.unwrap(), Bytes::from(value));
    }

    // Get on a key never written is a miss.
    #[test]
    fn prop_get_unwritten_key_is_not_found(key in valid_key_strategy()) {
        let gateway = new_gateway();

        let result = tokio_test::block_on(gateway.get(get_req(&key)));
        prop_assert!(matches!(result, Err(GatewayError::NotFound(_))));
    }

    // Expire keeps the value byte-for-byte for any non-negative expiration.
    #[test]
    fn prop_expire_preserves_value(
        key in valid_key_strategy(),
        value in value_strategy(),
        secs in 0i64..=i64::MAX
    ) {
        let gateway = new_gateway();

        let (expired, read_back) = tokio_test::block_on(async {
            gateway.set(set_req(&key, &value)).await.unwrap();
            let expired = gateway.expire(expire_req(&key, secs)).await;
            (expired, gateway.get(get_req(&key)).await)
        });

        prop_assert!(expired.is_ok());
        prop_assert_eq!(read_back.unwrap(), Bytes::from(value));
    }

    // Expire on an absent key is a miss and does not create the key.
    #[test]
    fn prop_expire_absent_key_creates_nothing(key in valid_key_strategy(), secs in 0i64..=i64::MAX) {
        let store = Arc::new(MemoryStore::new());
        let gateway = CacheGateway::new(store.clone());

        let result = tokio_test::block_on(gateway.expire(expire_req(&key, secs)));

        prop_assert!(matches!(result, Err(GatewayError::NotFound(_))));
        prop_assert!(tokio_test::block_on(store.is_empty()));
    }

    // Negative expirations are rejected whether or not the key exists.
    #[test]
    fn prop_negative_expiration_rejected(
        key in valid_key_strategy(),
        secs in i64::MIN..0,
        exists in any::<bool>()
    ) {
        let gateway = new_gateway();

        let result = tokio_test::block_on(async {
            if exists {
                gateway.set(set_req(&key, "v")).await.unwrap();
            }
            gateway.expire(expire_req(&key, secs)).await
        });

        prop_assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }
}
