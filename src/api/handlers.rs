//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint. Bodies are decoded here so
//! a malformed request is answered before the store is touched.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::CacheGateway;
use crate::models::{decode, ExpireRequest, GetRequest, HealthResponse, SetRequest};
use crate::store::CacheStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: CacheGateway,
}

impl AppState {
    pub fn new(gateway: CacheGateway) -> Self {
        Self { gateway }
    }

    /// Builds the gateway over `store` with the configured CAS policy.
    pub fn from_config(store: Arc<dyn CacheStore>, config: &Config) -> Self {
        Self::new(CacheGateway::new(store).with_cas_attempts(config.expire_cas_attempts))
    }
}

/// Raw request body, or the reason it could not be read (e.g. over the size limit)
pub type RequestBody = std::result::Result<Bytes, BytesRejection>;

fn decode_body<T: DeserializeOwned>(op: &'static str, body: RequestBody) -> Result<T> {
    let body = body.map_err(|rejection| {
        warn!(op, error = %rejection, "Rejecting unreadable request body");
        rejection
    })?;

    decode(&body).map_err(|err| {
        warn!(op, error = %err, "Rejecting malformed request body");
        err.into()
    })
}

/// Handler for POST /get
///
/// Responds with the raw stored bytes.
pub async fn get_handler(State(state): State<AppState>, body: RequestBody) -> Result<Response> {
    let req: GetRequest = decode_body("get", body)?;
    let value = state.gateway.get(req).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value,
    )
        .into_response())
}

/// Handler for POST /set
pub async fn set_handler(State(state): State<AppState>, body: RequestBody) -> Result<StatusCode> {
    let req: SetRequest = decode_body("set", body)?;
    state.gateway.set(req).await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /expire
pub async fn expire_handler(State(state): State<AppState>, body: RequestBody) -> Result<StatusCode> {
    let req: ExpireRequest = decode_body("expire", body)?;
    state.gateway.expire(req).await?;
    Ok(StatusCode::OK)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
