//! Database initialization
//!
//! Creates the SQLite pool and the matching subsystem's tables. Every
//! statement is idempotent, so initialization is safe to run on each
//! startup against an existing database.
//!
//! Referential cleanup between items, matches, notifications and chat
//! messages is performed by the lifecycle cascade, not by foreign-key
//! actions, so the tables deliberately carry no REFERENCES clauses.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_items_table(&pool).await?;
    create_matches_table(&pool).await?;
    create_notifications_table(&pool).await?;
    create_chat_messages_table(&pool).await?;

    Ok(pool)
}

async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('lost', 'found')),
            description TEXT NOT NULL DEFAULT '',
            category TEXT,
            colors TEXT NOT NULL DEFAULT '[]',
            brand TEXT,
            condition TEXT,
            flaws TEXT,
            material TEXT,
            image_url TEXT NOT NULL,
            location TEXT NOT NULL,
            observed_at TEXT,
            created_at TEXT NOT NULL,
            is_resolved INTEGER NOT NULL DEFAULT 0,
            vision TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Candidate queries filter on (kind, is_resolved)
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_kind_resolved ON items(kind, is_resolved)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_user ON items(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_matches_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            item1_id TEXT NOT NULL,
            item2_id TEXT NOT NULL,
            user1_id TEXT NOT NULL,
            user2_id TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score >= 0 AND score <= 100),
            user1_confirmed INTEGER NOT NULL DEFAULT 0,
            user2_confirmed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CHECK (item1_id <> item2_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The sibling sweep and user listings look up by either position
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_item1 ON matches(item1_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_item2 ON matches(item2_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_user1 ON matches(user1_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_user2 ON matches(user2_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            match_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notifications_match ON notifications(match_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_chat_messages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            match_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            content TEXT NOT NULL,
            sent_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_messages_match ON chat_messages(match_id)")
        .execute(pool)
        .await?;

    Ok(())
}
