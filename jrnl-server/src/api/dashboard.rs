//! Dashboard and analytics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use jrnl_common::api::ActionResponse;
use jrnl_common::db::EntryWithAnalysis;
use serde::{Deserialize, Serialize};

use super::auth::CurrentUser;
use crate::analytics::{compute_analytics, AnalyticsData};
use crate::db;
use crate::error::ApiResult;
use crate::AppState;

pub const DEFAULT_DASHBOARD_LIMIT: i64 = 5;
const MAX_DASHBOARD_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub recent_entries: Vec<EntryWithAnalysis>,
    pub total_entries: i64,
    pub analyzed_entries: i64,
}

/// GET /api/dashboard?limit=N
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<ActionResponse<DashboardData>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_DASHBOARD_LIMIT)
        .clamp(1, MAX_DASHBOARD_LIMIT);

    let data = DashboardData {
        recent_entries: db::list_entries(&state.db, &user.id, limit, 0).await?,
        total_entries: db::count_entries(&state.db, &user.id).await?,
        analyzed_entries: db::count_analyzed_entries(&state.db, &user.id).await?,
    };

    Ok(Json(ActionResponse::ok("Dashboard data retrieved successfully", data)))
}

/// GET /api/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ActionResponse<AnalyticsData>>> {
    let entries = db::list_all_entries(&state.db, &user.id).await?;
    let data = compute_analytics(&entries);

    let message = if data.analyzed_entries == 0 {
        "No analyzed entries found"
    } else {
        "Analytics data retrieved successfully"
    };

    Ok(Json(ActionResponse::ok(message, data)))
}
