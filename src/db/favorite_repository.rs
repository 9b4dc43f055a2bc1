// src/db/favorite_repository.rs
// DOCUMENTATION: Favorite fragrances database operations

use crate::db::is_unique_violation;
use crate::errors::HubError;
use crate::models::{AddFavoriteRequest, Favorite};
use chrono::Utc;
use sqlx::SqlitePool;

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Add a favorite; a repeated fragrance for the same user is a conflict
    pub async fn add_favorite(
        pool: &SqlitePool,
        user_id: i64,
        req: &AddFavoriteRequest,
    ) -> Result<Favorite, HubError> {
        let fragrance_name = req.fragrance_name.trim();

        let result = sqlx::query(
            r#"
            INSERT INTO user_favorites (user_id, fragrance_name, brand, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(fragrance_name)
        .bind(req.brand.as_deref().map(str::trim))
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HubError::AlreadyExists(format!("{} is already in favorites", fragrance_name))
            } else {
                log::error!("Failed to add favorite: {}", e);
                HubError::DatabaseError(format!("Add favorite failed: {}", e))
            }
        })?;

        sqlx::query_as::<_, Favorite>(
            "SELECT id, user_id, fragrance_name, brand, created_at FROM user_favorites WHERE id = $1",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch favorite: {}", e);
            HubError::DatabaseError(format!("Fetch favorite failed: {}", e))
        })
    }

    /// Favorites for a user, newest first
    pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Favorite>, HubError> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, fragrance_name, brand, created_at
            FROM user_favorites
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list favorites for user {}: {}", user_id, e);
            HubError::DatabaseError(format!("List favorites failed: {}", e))
        })
    }

    pub async fn remove_favorite(
        pool: &SqlitePool,
        user_id: i64,
        fragrance_name: &str,
    ) -> Result<(), HubError> {
        let result = sqlx::query(
            "DELETE FROM user_favorites WHERE user_id = $1 AND fragrance_name = $2",
        )
        .bind(user_id)
        .bind(fragrance_name)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to remove favorite: {}", e);
            HubError::DatabaseError(format!("Remove favorite failed: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!(
                "{} is not in favorites",
                fragrance_name
            )));
        }

        Ok(())
    }

    pub async fn is_favorite(
        pool: &SqlitePool,
        user_id: i64,
        fragrance_name: &str,
    ) -> Result<bool, HubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_favorites WHERE user_id = $1 AND fragrance_name = $2",
        )
        .bind(user_id)
        .bind(fragrance_name)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to check favorite for user {}: {}", user_id, e);
            HubError::DatabaseError(format!("Check favorite failed: {}", e))
        })?;

        Ok(count.0 > 0)
    }
}
