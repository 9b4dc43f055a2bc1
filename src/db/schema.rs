// src/db/schema.rs
// DOCUMENTATION: Startup schema creation and additive migrations
// PURPOSE: Bring any existing database file up to the current table layout

use crate::errors::HubError;
use sqlx::{Row, SqlitePool};

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE COLLATE NOCASE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_settings (
        user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        email_notifications INTEGER NOT NULL DEFAULT 1,
        public_profile INTEGER NOT NULL DEFAULT 1,
        show_favorites INTEGER NOT NULL DEFAULT 1,
        theme TEXT NOT NULL DEFAULT 'light' CHECK (theme IN ('light', 'dark')),
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_favorites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        fragrance_name TEXT NOT NULL COLLATE NOCASE,
        brand TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, fragrance_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        fragrance_name TEXT NOT NULL COLLATE NOCASE,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        content TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, fragrance_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS review_likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        review_id INTEGER NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        like_type TEXT NOT NULL CHECK (like_type IN ('like', 'dislike')),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (review_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS review_replies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        review_id INTEGER NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        parent_reply_id INTEGER REFERENCES review_replies(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reply_likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reply_id INTEGER NOT NULL REFERENCES review_replies(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        like_type TEXT NOT NULL CHECK (like_type IN ('like', 'dislike')),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (reply_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_avatars (
        user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        content_type TEXT NOT NULL,
        data BLOB NOT NULL,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

/// Columns added after the first release, as (table, column, definition).
/// Older database files gain them through ALTER TABLE on startup.
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[
    ("users", "display_name", "TEXT"),
    ("users", "bio", "TEXT"),
    ("users", "avatar_url", "TEXT"),
    ("users", "is_verified", "INTEGER NOT NULL DEFAULT 0"),
    ("users", "verification_token", "TEXT"),
    ("users", "verification_expires_at", "TEXT"),
    ("users", "is_admin", "INTEGER NOT NULL DEFAULT 0"),
    ("users", "is_banned", "INTEGER NOT NULL DEFAULT 0"),
    ("users", "ban_reason", "TEXT"),
    ("users", "banned_at", "TEXT"),
    ("users", "last_login_at", "TEXT"),
    ("reviews", "title", "TEXT"),
    ("reviews", "is_edited", "INTEGER NOT NULL DEFAULT 0"),
    ("review_replies", "is_edited", "INTEGER NOT NULL DEFAULT 0"),
];

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_reviews_fragrance ON reviews(fragrance_name)",
    "CREATE INDEX IF NOT EXISTS idx_replies_review ON review_replies(review_id)",
    "CREATE INDEX IF NOT EXISTS idx_replies_parent ON review_replies(parent_reply_id)",
    "CREATE INDEX IF NOT EXISTS idx_users_verification ON users(verification_token)",
];

/// Create tables, add missing columns, create indexes
/// DOCUMENTATION: Idempotent; safe to run on every startup
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), HubError> {
    for statement in CREATE_TABLES {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            log::error!("Failed to create table: {}", e);
            HubError::DatabaseError(format!("Create table failed: {}", e))
        })?;
    }

    let mut added = 0;
    for (table, column, definition) in ADDED_COLUMNS {
        if ensure_column(pool, table, column, definition).await? {
            added += 1;
        }
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            log::error!("Failed to create index: {}", e);
            HubError::DatabaseError(format!("Create index failed: {}", e))
        })?;
    }

    if added > 0 {
        log::info!("Schema migrated: {} column(s) added", added);
    } else {
        log::debug!("Schema up to date");
    }

    Ok(())
}

/// Add a column when PRAGMA table_info does not list it.
/// Returns true when the column was added.
async fn ensure_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<bool, HubError> {
    // PRAGMA arguments cannot be bound; table names come from the constant above
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to inspect table {}: {}", table, e);
            HubError::DatabaseError(format!("Inspect table failed: {}", e))
        })?;

    let exists = rows
        .iter()
        .any(|row| row.get::<String, _>("name").eq_ignore_ascii_case(column));

    if exists {
        return Ok(false);
    }

    sqlx::query(&format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        table, column, definition
    ))
    .execute(pool)
    .await
    .map_err(|e| {
        log::error!("Failed to add column {}.{}: {}", table, column, e);
        HubError::DatabaseError(format!("Add column failed: {}", e))
    })?;

    log::info!("Added column {}.{}", table, column);
    Ok(true)
}
