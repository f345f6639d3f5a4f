//! Request and Response models for the gateway API
//!
//! This module defines the DTOs used for deserializing HTTP request bodies
//! and serializing the few JSON responses.

pub mod codec;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use codec::{decode, DecodeError};
pub use requests::{validate_key, ExpireRequest, GetRequest, SetRequest};
pub use responses::HealthResponse;
