// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Like or dislike; stored as text under a CHECK constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Reaction::Like),
            "dislike" => Ok(Reaction::Dislike),
            other => Err(format!("unknown reaction: {}", other)),
        }
    }
}

/// Stored fragrance review
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub fragrance_name: String,
    pub rating: i64,
    pub title: Option<String>,
    pub content: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review joined with its author and reaction counts
/// DOCUMENTATION: Shape returned by listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewView {
    pub id: i64,
    pub user_id: i64,
    pub fragrance_name: String,
    pub rating: i64,
    pub title: Option<String>,
    pub content: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub reply_count: i64,
    pub user_reaction: Option<Reaction>,
}

/// Request to create a review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, max = 200))]
    pub fragrance_name: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i64,

    #[validate(length(max = 100))]
    pub title: Option<String>,

    pub content: String,
}

/// Request to edit a review; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i64>,

    #[validate(length(max = 100))]
    pub title: Option<String>,

    pub content: Option<String>,
}

/// Ordering for review listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
    Helpful,
}

impl ReviewSort {
    /// ORDER BY clause; every variant is a fixed string, never user text
    pub fn order_by(&self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC, r.id DESC",
            ReviewSort::Oldest => "r.created_at ASC, r.id ASC",
            ReviewSort::Highest => "r.rating DESC, r.created_at DESC, r.id DESC",
            ReviewSort::Lowest => "r.rating ASC, r.created_at DESC, r.id DESC",
            ReviewSort::Helpful => "(likes - dislikes) DESC, r.created_at DESC, r.id DESC",
        }
    }
}

/// Highest page a listing will serve; larger requests get this page
pub const MAX_PAGE: i64 = 10_000;

/// GET /api/reviews query string
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewListQuery {
    pub fragrance: String,
    #[serde(default)]
    pub sort: ReviewSort,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ReviewListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 50)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub data: Vec<ReviewView>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSummaryQuery {
    pub fragrance: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub fragrance_name: String,
    pub review_count: i64,
    pub average_rating: Option<f64>,
    /// Counts for ratings 1 through 5, in order
    pub distribution: [i64; 5],
}

/// POST /api/reviews/like body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReactionRequest {
    pub review_id: i64,
    pub like_type: Reaction,
}

/// POST /api/replies/{id}/like body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRequest {
    pub like_type: Reaction,
}

/// Counts after a toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
    pub user_reaction: Option<Reaction>,
}

#[derive(Debug, Serialize)]
pub struct ReviewReactionResponse {
    pub review_id: i64,
    #[serde(flatten)]
    pub counts: ReactionCounts,
}
