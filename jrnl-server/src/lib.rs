//! jrnl-server library - journaling service with LLM mood analysis
//!
//! Entry CRUD over SQLite, an analysis pipeline (prompt → provider →
//! normalizer, with fallback), and dashboard/analytics aggregation.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod pagination;

pub use analysis::JournalAnalyzer;
pub use error::{ApiError, ApiResult};

use llm::LlmProvider;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Shared secret for request signing (0 disables checks)
    pub shared_secret: i64,
    pub analyzer: JournalAnalyzer,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, shared_secret: i64, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            db,
            shared_secret,
            analyzer: JournalAnalyzer::new(provider),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// `/health` is public; every `/api/*` route passes the signature middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let protected = Router::new()
        .route("/api/users", put(api::upsert_user).delete(api::delete_user))
        .route("/api/entries", post(api::create_entry).get(api::list_entries))
        .route(
            "/api/entries/:id",
            get(api::get_entry)
                .put(api::update_entry)
                .delete(api::delete_entry),
        )
        .route("/api/entries/:id/analysis", post(api::analyze_entry))
        .route("/api/query", post(api::query_entries))
        .route("/api/insights", get(api::get_insights))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/analytics", get(api::get_analytics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
