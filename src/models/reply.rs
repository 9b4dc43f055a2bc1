// src/models/reply.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Reaction;

/// Stored reply row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reply {
    pub id: i64,
    pub review_id: i64,
    pub user_id: i64,
    pub parent_reply_id: Option<i64>,
    pub content: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reply joined with author and reaction counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReplyView {
    pub id: i64,
    pub review_id: i64,
    pub user_id: i64,
    pub parent_reply_id: Option<i64>,
    pub content: String,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub user_reaction: Option<Reaction>,
}

/// One node of a reply thread
#[derive(Debug, Clone, Serialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: ReplyView,
    pub children: Vec<ReplyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReplyRequest {
    pub content: String,
    pub parent_reply_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReplyRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyThreadResponse {
    pub review_id: i64,
    pub total_count: usize,
    pub replies: Vec<ReplyNode>,
}

#[derive(Debug, Serialize)]
pub struct ReplyReactionResponse {
    pub reply_id: i64,
    #[serde(flatten)]
    pub counts: super::ReactionCounts,
}
