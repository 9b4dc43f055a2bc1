// src/db/avatar_repository.rs
// DOCUMENTATION: Stored avatar images
// PURPOSE: Keep one processed avatar per user and point users.avatar_url at it

use crate::errors::HubError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// A processed avatar as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredAvatar {
    pub user_id: i64,
    pub content_type: String,
    pub data: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

/// Public path an uploaded avatar is served from
pub fn avatar_path(user_id: i64) -> String {
    format!("/api/avatars/{}", user_id)
}

fn db_error(context: &str, e: sqlx::Error) -> HubError {
    log::error!("{}: {}", context, e);
    HubError::DatabaseError(format!("{}: {}", context, e))
}

pub struct AvatarRepository;

impl AvatarRepository {
    /// Replace the user's avatar and update avatar_url in one transaction
    pub async fn save(
        pool: &SqlitePool,
        user_id: i64,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, HubError> {
        let now = Utc::now();
        let url = avatar_path(user_id);
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        sqlx::query(
            r#"
            INSERT INTO user_avatars (user_id, content_type, data, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                content_type = excluded.content_type,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(content_type)
        .bind(data)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Save avatar failed", e))?;

        let result = sqlx::query("UPDATE users SET avatar_url = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id)
            .bind(&url)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Update avatar url failed", e))?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!("User not found: {}", user_id)));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        log::info!("Stored avatar for user {} ({} bytes)", user_id, data.len());
        Ok(url)
    }

    pub async fn find(pool: &SqlitePool, user_id: i64) -> Result<Option<StoredAvatar>, HubError> {
        sqlx::query_as::<_, StoredAvatar>(
            "SELECT user_id, content_type, data, updated_at FROM user_avatars WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch avatar failed", e))
    }
}
