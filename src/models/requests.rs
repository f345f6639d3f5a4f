//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies. The codec folds
//! field names to lowercase before they reach these types, so `Key`, `key`
//! and `KEY` all land on `key`. Missing fields take their zero value.

use serde::Deserialize;

use crate::store::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};

/// Checks the key rules shared by every request kind.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for POST /get
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetRequest {
    pub key: String,
}

impl GetRequest {
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for POST /set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
}

impl SetRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_key(&self.key) {
            return Some(msg);
        }
        if self.value.len() > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }
}

/// Request body for POST /expire
///
/// `expiration` is in seconds; 0 removes the expiration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpireRequest {
    pub key: String,
    pub expiration: i64,
}

impl ExpireRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_key(&self.key) {
            return Some(msg);
        }
        if self.expiration < 0 {
            return Some("Expiration cannot be negative".to_string());
        }
        None
    }
}
