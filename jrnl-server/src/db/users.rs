//! User records keyed by the identity provider's user id

use jrnl_common::db::User;
use jrnl_common::time::{now, parse_storage, to_storage};
use jrnl_common::{uuid_utils, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Profile fields supplied on upsert
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub async fn find_user_by_external_id(pool: &SqlitePool, external_id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, external_id, email, full_name, image_url, created_at, updated_at
         FROM users WHERE external_id = ?",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| user_from_row(&r)).transpose()
}

/// Create the user or update its profile, returning the stored record
pub async fn upsert_user(pool: &SqlitePool, external_id: &str, profile: &UserProfile) -> Result<User> {
    let ts = to_storage(&now());

    sqlx::query(
        r#"
        INSERT INTO users (id, external_id, email, full_name, image_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            email = excluded.email,
            full_name = excluded.full_name,
            image_url = excluded.image_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(uuid_utils::new_id())
    .bind(external_id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.image_url)
    .bind(&ts)
    .bind(&ts)
    .execute(pool)
    .await?;

    find_user_by_external_id(pool, external_id)
        .await?
        .ok_or_else(|| jrnl_common::Error::Internal("User missing after upsert".into()))
}

/// Delete the user; entries and analyses cascade. Returns whether a row was removed.
pub async fn delete_user(pool: &SqlitePool, external_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE external_id = ?")
        .bind(external_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        image_url: row.try_get("image_url")?,
        created_at: parse_storage(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_storage(&row.try_get::<String, _>("updated_at")?)?,
    })
}
