//! User profile endpoints
//!
//! The identity provider owns accounts; these keep the local copy in sync.

use axum::{extract::State, Json};
use jrnl_common::api::ActionResponse;
use jrnl_common::db::User;
use tracing::info;

use super::auth::CallerId;
use crate::db::{self, UserProfile};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// PUT /api/users
///
/// Creates the caller's record on first call, updates the profile afterwards.
pub async fn upsert_user(
    State(state): State<AppState>,
    CallerId(external_id): CallerId,
    Json(profile): Json<UserProfile>,
) -> ApiResult<Json<ActionResponse<User>>> {
    if profile.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required", "MISSING_EMAIL"));
    }
    if profile.full_name.trim().is_empty() {
        return Err(ApiError::bad_request("Full name is required", "MISSING_FULL_NAME"));
    }

    let user = db::upsert_user(&state.db, &external_id, &profile).await?;
    info!(user_id = %user.id, "User profile saved");

    Ok(Json(ActionResponse::ok("User saved successfully", user)))
}

/// DELETE /api/users
///
/// Removes the caller and, by cascade, all of their entries and analyses.
pub async fn delete_user(
    State(state): State<AppState>,
    CallerId(external_id): CallerId,
) -> ApiResult<Json<ActionResponse<()>>> {
    if !db::delete_user(&state.db, &external_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    info!(external_id = %external_id, "User deleted");

    Ok(Json(ActionResponse::ok_empty("User deleted successfully")))
}
