//! Error types for jrnl-server
//!
//! Every error renders as the standard envelope:
//! `{"success": false, "message": ..., "error": CODE}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jrnl_common::api::ActionResponse;
use thiserror::Error;
use tracing::error;

use crate::analysis::AnalysisError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400); `code` names the failed check
    #[error("{message}")]
    BadRequest { message: String, code: &'static str },

    /// Missing or unknown caller (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// jrnl-common error
    #[error("Common error: {0}")]
    Common(#[from] jrnl_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, code: &'static str) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            code,
        }
    }

    pub fn entry_not_found() -> Self {
        ApiError::NotFound("Journal entry not found".to_string())
    }

    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized("User not authenticated".to_string())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let code = match err {
            AnalysisError::EmptyContent => "EMPTY_CONTENT",
            AnalysisError::EmptyQuery => "EMPTY_QUERY",
        };
        ApiError::bad_request(err.to_string(), code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Common(jrnl_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(jrnl_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => {
                error!("Common error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR", err.to_string())
            }
            ApiError::Other(ref err) => {
                error!("Unhandled error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
            }
        };

        let body: ActionResponse<()> = ActionResponse::failure(message, Some(code.to_string()));
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
