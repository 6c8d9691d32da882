//! API authentication via timestamp and hash validation
//!
//! # Scheme
//!
//! - Every `/api/*` request carries `timestamp` (i64 Unix epoch ms) and `hash` (SHA-256)
//! - Timestamp must be within 30 000 ms past and 1 000 ms future
//! - Hash is calculated from canonical JSON + shared secret
//! - Shared secret is stored in the database settings table
//! - Setting the shared secret to 0 disables checking
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here; the axum middleware lives in the server crate.

use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::time::epoch_millis;

/// Settings key holding the shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Maximum age of a request timestamp
pub const MAX_PAST_MS: i64 = 30_000;

/// Maximum clock skew ahead of the server
pub const MAX_FUTURE_MS: i64 = 1_000;

/// Placeholder substituted for `hash` before hashing
pub const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Authentication error types
#[derive(Error, Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    #[error("Invalid hash")]
    InvalidHash { provided: String, calculated: String },

    /// Database error loading shared secret
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ========================================
// Shared Secret Management
// ========================================

/// Load shared secret from database settings
///
/// Generates and stores a new secret when none exists yet. A stored value of
/// 0 disables auth checking.
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(SHARED_SECRET_KEY)
        .fetch_optional(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate a random non-zero secret and store it
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    store_shared_secret(db, secret).await?;
    Ok(secret)
}

/// Overwrite the stored secret (0 disables auth)
pub async fn store_shared_secret(db: &SqlitePool, secret: i64) -> Result<(), ApiAuthError> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SHARED_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(())
}

// ========================================
// Timestamp Validation
// ========================================

/// Validate a request timestamp against the current time
///
/// ```
/// use jrnl_common::api::auth::validate_timestamp;
/// use jrnl_common::time::epoch_millis;
///
/// let now = epoch_millis();
/// assert!(validate_timestamp(now).is_ok());
/// assert!(validate_timestamp(now - 60_000).is_err());
/// ```
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    validate_timestamp_at(timestamp, epoch_millis())
}

/// Validate a request timestamp against an explicit `now`
pub fn validate_timestamp_at(timestamp: i64, now: i64) -> Result<(), ApiAuthError> {
    let diff = now - timestamp;

    if diff > MAX_PAST_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, MAX_PAST_MS),
        });
    }

    if diff < -MAX_FUTURE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_FUTURE_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// Calculate the request hash
///
/// # Algorithm
///
/// 1. Replace hash field with dummy hash (64 zeros)
/// 2. Convert to canonical JSON (sorted keys, no whitespace)
/// 3. Append shared secret as decimal i64 string
/// 4. SHA-256, rendered as 64 hex characters
///
/// ```
/// use jrnl_common::api::auth::calculate_hash;
/// use serde_json::json;
///
/// let payload = json!({"content": "Dear diary", "timestamp": 1730000000000i64, "hash": ""});
/// assert_eq!(calculate_hash(&payload, 123456789).len(), 64);
/// ```
pub fn calculate_hash(json_value: &Value, shared_secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let to_hash = format!("{}{}", to_canonical_json(&value), shared_secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
///
/// ```
/// use jrnl_common::api::auth::to_canonical_json;
/// use serde_json::json;
///
/// let canonical = to_canonical_json(&json!({"z": 3, "a": 1}));
/// assert_eq!(canonical, r#"{"a":1,"z":3}"#);
/// ```
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}:{}", quote(k), to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::String(s) => quote(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// JSON string literal with standard escaping (newlines in entry text included)
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Validate hash matches calculated value
pub fn validate_hash(
    provided_hash: &str,
    json_value: &Value,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, shared_secret);

    if provided_hash != calculated {
        return Err(ApiAuthError::InvalidHash {
            provided: provided_hash.to_string(),
            calculated,
        });
    }

    Ok(())
}

/// Stamp `payload` with the current timestamp and a valid hash
///
/// Client-side counterpart of the middleware checks; used by tooling and tests.
pub fn sign_payload(payload: &mut Value, shared_secret: i64) {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("timestamp".to_string(), Value::from(epoch_millis()));
    }
    let hash = calculate_hash(payload, shared_secret);
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(hash));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_730_000_000_000;

    #[test]
    fn test_timestamp_window_boundaries() {
        assert!(validate_timestamp_at(NOW, NOW).is_ok());
        assert!(validate_timestamp_at(NOW - 30_000, NOW).is_ok());
        assert!(validate_timestamp_at(NOW + 1_000, NOW).is_ok());

        assert!(validate_timestamp_at(NOW - 30_001, NOW).is_err());
        assert!(validate_timestamp_at(NOW + 1_001, NOW).is_err());
    }

    #[test]
    fn test_timestamp_error_reason() {
        let err = validate_timestamp_at(NOW - 60_000, NOW).unwrap_err();
        assert!(err.to_string().contains("too old"));

        let err = validate_timestamp_at(NOW + 5_000, NOW).unwrap_err();
        assert!(err.to_string().contains("in future"));
    }

    #[test]
    fn test_hash_ignores_provided_hash_value() {
        let a = json!({"content": "hello", "timestamp": NOW, "hash": "anything"});
        let b = json!({"content": "hello", "timestamp": NOW, "hash": DUMMY_HASH});
        assert_eq!(calculate_hash(&a, 42), calculate_hash(&b, 42));
        assert_ne!(calculate_hash(&a, 42), calculate_hash(&a, 43));
    }

    #[test]
    fn test_canonical_json_sorting_and_whitespace() {
        let canonical = to_canonical_json(&json!({
            "z_field": "last",
            "a_field": [1, 2],
            "m_field": {"y": null, "b": true}
        }));
        assert_eq!(
            canonical,
            r#"{"a_field":[1,2],"m_field":{"b":true,"y":null},"z_field":"last"}"#
        );
    }

    #[test]
    fn test_canonical_json_escapes_control_characters() {
        let canonical = to_canonical_json(&json!({"content": "line one\nline \"two\""}));
        assert_eq!(canonical, r#"{"content":"line one\nline \"two\""}"#);
    }

    #[test]
    fn test_signed_payload_validates() {
        let mut payload = json!({"content": "Dear diary"});
        sign_payload(&mut payload, 987654321);

        let timestamp = payload["timestamp"].as_i64().unwrap();
        let hash = payload["hash"].as_str().unwrap().to_string();
        assert!(validate_timestamp(timestamp).is_ok());
        assert!(validate_hash(&hash, &payload, 987654321).is_ok());
        assert!(validate_hash(DUMMY_HASH, &payload, 987654321).is_err());
    }

    #[tokio::test]
    async fn test_shared_secret_generated_once() {
        let pool = crate::db::init::connect_in_memory().await.unwrap();

        let first = load_shared_secret(&pool).await.unwrap();
        let second = load_shared_secret(&pool).await.unwrap();
        assert_ne!(first, 0);
        assert_eq!(first, second);

        store_shared_secret(&pool, 0).await.unwrap();
        assert_eq!(load_shared_secret(&pool).await.unwrap(), 0);
    }
}
