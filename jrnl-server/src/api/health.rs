//! Health check endpoint
//!
//! Reports uptime, the configured provider and the most recent pipeline
//! failure so silent analysis fallbacks are visible to monitoring.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::analysis::PipelineFailure;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" after a pipeline failure
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// LLM backend label ("openai" / "ollama")
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<PipelineFailure>,
}

/// GET /health (no authentication)
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let last_failure = state.analyzer.last_failure().await;
    let status = if last_failure.is_some() { "degraded" } else { "ok" };

    Json(HealthResponse {
        status: status.to_string(),
        module: "jrnl-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        provider: state.analyzer.provider_name().to_string(),
        model: state.analyzer.model().to_string(),
        last_failure,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
