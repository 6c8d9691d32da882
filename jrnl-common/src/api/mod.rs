//! Shared HTTP API functionality
//!
//! Pure functions, database operations and shared types only. The server
//! wraps these with axum middleware and extractors.

pub mod auth;
pub mod types;

pub use auth::{
    calculate_hash, initialize_shared_secret, load_shared_secret, sign_payload, validate_hash,
    validate_timestamp, ApiAuthError,
};
pub use types::{ActionResponse, AuthQuery};
