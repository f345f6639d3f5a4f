//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `POST /get` - Retrieve a value by key
//! - `POST /set` - Store a key-value pair
//! - `POST /expire` - Change the expiration of an existing key
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
