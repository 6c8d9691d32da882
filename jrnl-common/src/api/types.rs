//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Signature fields: query string for GET/DELETE, JSON body otherwise
///
/// ```
/// // GET /api/entries?page=2&timestamp=1730000000000&hash=abc123...
/// use jrnl_common::api::types::AuthQuery;
///
/// let query = AuthQuery {
///     timestamp: 1730000000000,
///     hash: "abc123...".to_string(),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthQuery {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

/// Response envelope returned by every JSON endpoint
///
/// `{success, message, data?, error?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Successful response without payload
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Failed response with an optional error detail
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}
