//! LLM-backed endpoints: entry analysis, free-form query, insights

use axum::{
    extract::{Path, State},
    Json,
};
use jrnl_common::api::ActionResponse;
use jrnl_common::db::{AnalysisStatus, StoredAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::CurrentUser;
use crate::analysis::prompt::QUERY_CONTEXT_LIMIT;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to analyze; defaults to the stored entry content
    #[serde(default)]
    pub content: Option<String>,
}

/// Stored analysis plus how it was produced
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: StoredAnalysis,
    pub status: AnalysisStatus,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// POST /api/entries/:id/analysis
///
/// Overwrites any previous analysis of the entry.
pub async fn analyze_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
    body: Option<Json<AnalyzeRequest>>,
) -> ApiResult<Json<ActionResponse<AnalysisResponse>>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let item = db::get_entry(&state.db, &user.id, &entry_id)
        .await?
        .ok_or_else(ApiError::entry_not_found)?;

    let content = request.content.unwrap_or(item.entry.content);
    let outcome = state.analyzer.analyze(&content).await?;

    let stored = db::upsert_analysis(&state.db, &entry_id, &outcome.result).await?;
    info!(entry_id = %entry_id, status = ?outcome.status, mood = %stored.result.mood, "Entry analysis stored");

    let message = match outcome.status {
        AnalysisStatus::Analyzed => "Analysis completed successfully",
        AnalysisStatus::Fallback => "Analysis unavailable, stored neutral fallback",
    };

    Ok(Json(ActionResponse::ok(
        message,
        AnalysisResponse {
            analysis: stored,
            status: outcome.status,
        },
    )))
}

/// POST /api/query
///
/// Answers over the caller's ten most recent entries.
pub async fn query_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<ActionResponse<QueryResponse>>> {
    let entries = db::list_entries(&state.db, &user.id, QUERY_CONTEXT_LIMIT as i64, 0).await?;
    let response = state.analyzer.query(&request.query, &entries).await?;

    Ok(Json(ActionResponse::ok(
        "AI response generated successfully",
        QueryResponse { response },
    )))
}

/// GET /api/insights
pub async fn get_insights(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ActionResponse<InsightsResponse>>> {
    let analyses = db::list_user_analyses(&state.db, &user.id).await?;
    let insights = state.analyzer.insights(&analyses).await;

    Ok(Json(ActionResponse::ok(
        "Insights generated successfully",
        InsightsResponse { insights },
    )))
}
