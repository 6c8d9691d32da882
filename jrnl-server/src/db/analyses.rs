//! Analysis persistence: at most one record per entry, overwritten on re-analysis

use jrnl_common::db::{AnalysisResult, Mood, StoredAnalysis};
use jrnl_common::time::{now, parse_storage, to_storage};
use jrnl_common::{uuid_utils, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Insert or overwrite the entry's analysis
///
/// An entry deleted in the meantime yields `Error::NotFound`.
/// Concurrent writers for one entry are not serialized: the last upsert wins.
pub async fn upsert_analysis(
    pool: &SqlitePool,
    entry_id: &str,
    result: &AnalysisResult,
) -> Result<StoredAnalysis> {
    sqlx::query(
        r#"
        INSERT INTO journal_analyses (
            id, entry_id, summary, mood, negative, mood_score,
            positive_percentage, neutral_percentage, negative_percentage, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(entry_id) DO UPDATE SET
            summary = excluded.summary,
            mood = excluded.mood,
            negative = excluded.negative,
            mood_score = excluded.mood_score,
            positive_percentage = excluded.positive_percentage,
            neutral_percentage = excluded.neutral_percentage,
            negative_percentage = excluded.negative_percentage,
            created_at = excluded.created_at
        "#,
    )
    .bind(uuid_utils::new_id())
    .bind(entry_id)
    .bind(&result.summary)
    .bind(result.mood.as_str())
    .bind(result.negative as i64)
    .bind(result.mood_score)
    .bind(result.positive_percentage)
    .bind(result.neutral_percentage)
    .bind(result.negative_percentage)
    .bind(to_storage(&now()))
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            Error::NotFound("Journal entry not found".to_string())
        }
        other => Error::Database(other),
    })?;

    get_analysis(pool, entry_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Analysis for {} missing after upsert", entry_id)))
}

pub async fn get_analysis(pool: &SqlitePool, entry_id: &str) -> Result<Option<StoredAnalysis>> {
    let row = sqlx::query(
        "SELECT id, entry_id, summary, mood, negative, mood_score,
                positive_percentage, neutral_percentage, negative_percentage, created_at
         FROM journal_analyses WHERE entry_id = ?",
    )
    .bind(entry_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| analysis_from_row(&r, "id", "created_at")).transpose()
}

/// All analyses of the user's entries, most recent entry first
pub async fn list_user_analyses(pool: &SqlitePool, user_id: &str) -> Result<Vec<AnalysisResult>> {
    let rows = sqlx::query(
        "SELECT a.id, a.entry_id, a.summary, a.mood, a.negative, a.mood_score,
                a.positive_percentage, a.neutral_percentage, a.negative_percentage, a.created_at
         FROM journal_analyses a
         JOIN journal_entries e ON e.id = a.entry_id
         WHERE e.user_id = ?
         ORDER BY e.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| analysis_from_row(r, "id", "created_at").map(|stored| stored.result))
        .collect()
}

/// Map analysis columns; `id_column`/`created_column` name the aliases used by joins
pub(crate) fn analysis_from_row(
    row: &SqliteRow,
    id_column: &str,
    created_column: &str,
) -> Result<StoredAnalysis> {
    Ok(StoredAnalysis {
        id: row.try_get(id_column)?,
        entry_id: row.try_get("entry_id")?,
        result: AnalysisResult {
            summary: row.try_get("summary")?,
            mood: row.try_get::<String, _>("mood")?.parse::<Mood>()?,
            negative: row.try_get::<i64, _>("negative")? != 0,
            mood_score: row.try_get("mood_score")?,
            positive_percentage: row.try_get("positive_percentage")?,
            neutral_percentage: row.try_get("neutral_percentage")?,
            negative_percentage: row.try_get("negative_percentage")?,
        },
        created_at: parse_storage(&row.try_get::<String, _>(created_column)?)?,
    })
}
