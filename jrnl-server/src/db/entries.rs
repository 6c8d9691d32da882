//! Journal entry persistence
//!
//! Reads join the entry's analysis (if any) so callers get
//! `EntryWithAnalysis` in one query. Listings are newest first.

use jrnl_common::db::{EntryWithAnalysis, JournalEntry};
use jrnl_common::time::{now, parse_storage, to_storage};
use jrnl_common::{uuid_utils, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::analyses::analysis_from_row;

const SELECT_WITH_ANALYSIS: &str = r#"
    SELECT e.id, e.user_id, e.content, e.created_at, e.updated_at,
           a.id AS analysis_id, a.entry_id, a.summary, a.mood, a.negative, a.mood_score,
           a.positive_percentage, a.neutral_percentage, a.negative_percentage,
           a.created_at AS analysis_created_at
    FROM journal_entries e
    LEFT JOIN journal_analyses a ON a.entry_id = e.id
"#;

pub async fn create_entry(pool: &SqlitePool, user_id: &str, content: &str) -> Result<JournalEntry> {
    let ts = now();
    let entry = JournalEntry {
        id: uuid_utils::new_id(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        created_at: ts,
        updated_at: ts,
    };

    sqlx::query(
        "INSERT INTO journal_entries (id, user_id, content, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.user_id)
    .bind(&entry.content)
    .bind(to_storage(&entry.created_at))
    .bind(to_storage(&entry.updated_at))
    .execute(pool)
    .await?;

    Ok(entry)
}

/// Entry owned by `user_id`, with its analysis
pub async fn get_entry(
    pool: &SqlitePool,
    user_id: &str,
    entry_id: &str,
) -> Result<Option<EntryWithAnalysis>> {
    let sql = format!("{} WHERE e.id = ? AND e.user_id = ?", SELECT_WITH_ANALYSIS);
    let row = sqlx::query(&sql)
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| entry_from_row(&r)).transpose()
}

/// One page of the user's entries, newest first
pub async fn list_entries(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<EntryWithAnalysis>> {
    let sql = format!(
        "{} WHERE e.user_id = ? ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?",
        SELECT_WITH_ANALYSIS
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Every entry of the user, newest first
pub async fn list_all_entries(pool: &SqlitePool, user_id: &str) -> Result<Vec<EntryWithAnalysis>> {
    let sql = format!(
        "{} WHERE e.user_id = ? ORDER BY e.created_at DESC, e.id DESC",
        SELECT_WITH_ANALYSIS
    );
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(pool).await?;

    rows.iter().map(entry_from_row).collect()
}

pub async fn count_entries(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_analyzed_entries(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM journal_entries e
         JOIN journal_analyses a ON a.entry_id = e.id
         WHERE e.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Replace the content and bump `updated_at`; `None` if not owned by the user
pub async fn update_entry_content(
    pool: &SqlitePool,
    user_id: &str,
    entry_id: &str,
    content: &str,
) -> Result<Option<EntryWithAnalysis>> {
    let result = sqlx::query(
        "UPDATE journal_entries SET content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(content)
    .bind(to_storage(&now()))
    .bind(entry_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_entry(pool, user_id, entry_id).await
}

/// Delete an entry (its analysis cascades). Returns whether a row was removed.
pub async fn delete_entry(pool: &SqlitePool, user_id: &str, entry_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn entry_from_row(row: &SqliteRow) -> Result<EntryWithAnalysis> {
    let entry = JournalEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        content: row.try_get("content")?,
        created_at: parse_storage(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_storage(&row.try_get::<String, _>("updated_at")?)?,
    };

    let analysis = match row.try_get::<Option<String>, _>("analysis_id")? {
        Some(_) => Some(analysis_from_row(row, "analysis_id", "analysis_created_at")?),
        None => None,
    };

    Ok(EntryWithAnalysis { entry, analysis })
}
