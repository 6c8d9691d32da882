//! Journal entry CRUD endpoints
//!
//! All lookups are scoped to the calling user; another user's entry is
//! indistinguishable from a missing one.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use jrnl_common::api::ActionResponse;
use jrnl_common::db::EntryWithAnalysis;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::auth::CurrentUser;
use crate::analysis::AnalysisError;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, Page, ENTRIES_PAGE_SIZE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntry {
    pub entry_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
}

fn require_content(content: &str) -> ApiResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AnalysisError::EmptyContent.into());
    }
    Ok(content)
}

/// POST /api/entries
pub async fn create_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ContentRequest>,
) -> ApiResult<Json<ActionResponse<CreatedEntry>>> {
    let content = require_content(&request.content)?;
    let entry = db::create_entry(&state.db, &user.id, content).await?;
    info!(entry_id = %entry.id, user_id = %user.id, "Journal entry created");

    Ok(Json(ActionResponse::ok(
        "Journal entry created successfully",
        CreatedEntry { entry_id: entry.id },
    )))
}

/// GET /api/entries?page=N
pub async fn list_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ActionResponse<Page<EntryWithAnalysis>>>> {
    let total = db::count_entries(&state.db, &user.id).await?;
    let pagination = calculate_pagination(total, query.page.unwrap_or(1), ENTRIES_PAGE_SIZE);

    let items = db::list_entries(&state.db, &user.id, pagination.page_size, pagination.offset).await?;

    Ok(Json(ActionResponse::ok(
        "Journal entries retrieved successfully",
        Page::new(items, pagination, total),
    )))
}

/// GET /api/entries/:id
///
/// An entry without analysis is analyzed and the result stored on first view.
pub async fn get_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
) -> ApiResult<Json<ActionResponse<EntryWithAnalysis>>> {
    let mut item = db::get_entry(&state.db, &user.id, &entry_id)
        .await?
        .ok_or_else(ApiError::entry_not_found)?;

    if item.analysis.is_none() {
        match state.analyzer.analyze(&item.entry.content).await {
            Ok(outcome) => {
                let stored = db::upsert_analysis(&state.db, &item.entry.id, &outcome.result).await?;
                info!(entry_id = %entry_id, status = ?outcome.status, "Analyzed entry on first view");
                item.analysis = Some(stored);
            }
            Err(e) => debug!(entry_id = %entry_id, error = %e, "Skipping first-view analysis"),
        }
    }

    Ok(Json(ActionResponse::ok("Journal entry retrieved successfully", item)))
}

/// PUT /api/entries/:id
///
/// The stored analysis is kept; re-analysis is an explicit request.
pub async fn update_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
    Json(request): Json<ContentRequest>,
) -> ApiResult<Json<ActionResponse<EntryWithAnalysis>>> {
    let content = require_content(&request.content)?;
    let item = db::update_entry_content(&state.db, &user.id, &entry_id, content)
        .await?
        .ok_or_else(ApiError::entry_not_found)?;
    info!(entry_id = %entry_id, "Journal entry updated");

    Ok(Json(ActionResponse::ok("Journal entry updated successfully", item)))
}

/// DELETE /api/entries/:id
pub async fn delete_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
) -> ApiResult<Json<ActionResponse<()>>> {
    if !db::delete_entry(&state.db, &user.id, &entry_id).await? {
        return Err(ApiError::entry_not_found());
    }
    info!(entry_id = %entry_id, "Journal entry deleted");

    Ok(Json(ActionResponse::ok_empty("Journal entry deleted successfully")))
}
