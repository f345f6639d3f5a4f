//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::DecodeError;
use crate::store::StoreError;

// == Gateway Error Enum ==
/// Every non-success outcome of a gateway operation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request body could not be read, e.g. over the size limit
    #[error("Unreadable request body: {0}")]
    Body(#[from] BytesRejection),

    /// Request body could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Well-formed request with invalid content
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The store failed or could not be reached
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every compare-and-swap attempt lost to a concurrent write
    #[error("Concurrent update on {key} after {attempts} attempts")]
    Conflict { key: String, attempts: u32 },
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Body(_) | GatewayError::Decode(_) | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Store(_) | GatewayError::Conflict { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
// Callers only see the status class; details stay in the logs.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
