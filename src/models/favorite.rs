// src/models/favorite.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A fragrance saved by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub fragrance_name: String,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to add a favorite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddFavoriteRequest {
    #[validate(length(min = 1, max = 200))]
    pub fragrance_name: String,

    #[validate(length(max = 100))]
    pub brand: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteCheckResponse {
    pub fragrance_name: String,
    pub is_favorite: bool,
}
