//! HTTP API handlers for jrnl-server

pub mod analysis;
pub mod auth;
pub mod dashboard;
pub mod entries;
pub mod health;
pub mod users;

pub use analysis::{analyze_entry, get_insights, query_entries};
pub use auth::auth_middleware;
pub use dashboard::{get_analytics, get_dashboard};
pub use entries::{create_entry, delete_entry, get_entry, list_entries, update_entry};
pub use health::health_routes;
pub use users::{delete_user, upsert_user};
