//! Database schema migrations
//!
//! Versioned migrations tracked in the `schema_version` table. Tables are
//! created by `init` with `CREATE TABLE IF NOT EXISTS`; changes to tables
//! that already exist in deployed databases go here.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - deployed databases already ran them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Idempotent** - check before altering (pragma_table_info, IF NOT EXISTS)

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: index entries by owner and creation time
///
/// Every listing (dashboard, analytics, query context) filters by user and
/// orders newest first.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: journal_entries (user_id, created_at) index");

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_journal_entries_user_created
         ON journal_entries (user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
