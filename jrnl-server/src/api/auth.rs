//! Authentication middleware and caller identity extractors
//!
//! Two layers:
//! - `auth_middleware` checks the request signature (timestamp + SHA-256
//!   hash). GET/DELETE carry the fields in the query string, other methods
//!   in the JSON body.
//! - `CurrentUser` / `CallerId` read the external user id forwarded by the
//!   upstream identity provider in `x-user-id`.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Query, Request, State},
    http::{request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jrnl_common::api::auth::{validate_hash, validate_timestamp, ApiAuthError};
use jrnl_common::api::{ActionResponse, AuthQuery};
use jrnl_common::db::User;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::db::find_user_by_external_id;
use crate::error::ApiError;
use crate::AppState;

/// Header carrying the identity provider's verified user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Request bodies above this size are rejected before hashing
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Signature check for `/api/*` routes
///
/// A shared secret of 0 disables checking entirely.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let carries_query = matches!(*request.method(), Method::GET | Method::DELETE | Method::HEAD);

    let (payload, request) = if carries_query {
        let payload = query_payload(&request)?;
        (payload, request)
    } else {
        let (parts, body) = request.into_parts();
        let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AuthError::ParseError(format!("Failed to read body: {}", e)))?;

        let payload: Value = serde_json::from_slice(&body_bytes)
            .map_err(|e| AuthError::ParseError(format!("Invalid JSON: {}", e)))?;

        // Restore body for downstream handlers
        (payload, Request::from_parts(parts, Body::from(body_bytes)))
    };

    let fields: AuthQuery = serde_json::from_value(payload.clone())
        .map_err(|e| AuthError::MissingFields(e.to_string()))?;

    validate_timestamp(fields.timestamp).map_err(|e| match e {
        ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
        other => AuthError::Other(other.to_string()),
    })?;

    validate_hash(&fields.hash, &payload, state.shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidHash { provided, calculated } => {
            warn!(
                "Hash validation failed: provided={}, calculated={}",
                provided, calculated
            );
            AuthError::InvalidHash
        }
        other => AuthError::Other(other.to_string()),
    })?;

    Ok(next.run(request).await)
}

/// Query parameters as a JSON object; `timestamp` is numeric, the rest strings
fn query_payload(request: &Request) -> Result<Value, AuthError> {
    let Query(params) = Query::<BTreeMap<String, String>>::try_from_uri(request.uri())
        .map_err(|e| AuthError::ParseError(format!("Invalid query string: {}", e)))?;

    let mut object = Map::new();
    for (key, value) in params {
        let json_value = if key == "timestamp" {
            value
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| AuthError::MissingFields("timestamp must be an integer".into()))?
        } else {
            Value::String(value)
        };
        object.insert(key, json_value);
    }

    Ok(Value::Object(object))
}

/// Signature failures
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    ParseError(String),
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TIMESTAMP",
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidHash => {
                (StatusCode::UNAUTHORIZED, "INVALID_HASH", "Invalid hash".to_string())
            }
            AuthError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "MISSING_AUTH_FIELDS",
                format!("Missing required fields: {}", msg),
            ),
            AuthError::ParseError(msg) => {
                (StatusCode::BAD_REQUEST, "PARSE_ERROR", format!("Parse error: {}", msg))
            }
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_ERROR",
                format!("Authentication error: {}", msg),
            ),
        };

        let body: ActionResponse<()> = ActionResponse::failure(message, Some(code.to_string()));
        (status, Json(body)).into_response()
    }
}

/// External user id from `x-user-id`, without requiring a local record
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or_else(ApiError::not_authenticated)
    }
}

/// The calling user's local record
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CallerId(external_id) = CallerId::from_request_parts(parts, state).await?;

        find_user_by_external_id(&state.db, &external_id)
            .await?
            .map(CurrentUser)
            .ok_or_else(ApiError::not_authenticated)
    }
}
