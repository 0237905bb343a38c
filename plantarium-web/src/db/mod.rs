//! Database access
//!
//! Connection pool initialization and startup table creation.

use std::path::Path;

use plantarium_common::Result;
use sqlx::SqlitePool;

pub mod plants;

/// Open (or create) the service database and run startup migrations
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!(url = %db_url, "Connecting to database");

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create service tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scientific_name TEXT NOT NULL,
            common_name TEXT,
            family TEXT,
            family_common_name TEXT,
            genus TEXT,
            image_url TEXT,
            author TEXT,
            bibliography TEXT,
            year INTEGER,
            synonyms TEXT,
            slug TEXT,
            trefle_id INTEGER,
            perenual_id INTEGER,
            metadata TEXT NOT NULL DEFAULT '{}',
            notes TEXT,
            nickname TEXT,
            location TEXT,
            acquired_date TEXT,
            status TEXT,
            added_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rate_limits (
            key TEXT PRIMARY KEY,
            timestamps TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (plants, rate_limits)");

    Ok(())
}
