//! Database access layer
//!
//! Repository functions over the shared schema in `jrnl_common::db`. Every
//! entry query is scoped by the owning user's id.

pub mod analyses;
pub mod entries;
pub mod users;

pub use analyses::{get_analysis, list_user_analyses, upsert_analysis};
pub use entries::{
    count_analyzed_entries, count_entries, create_entry, delete_entry, get_entry,
    list_all_entries, list_entries, update_entry_content,
};
pub use users::{delete_user, find_user_by_external_id, upsert_user, UserProfile};
