// src/db/reply_repository.rs
// DOCUMENTATION: Threaded reply database operations

use crate::errors::HubError;
use crate::models::{Reply, ReplyView};
use chrono::Utc;
use sqlx::SqlitePool;

const REPLY_COLUMNS: &str =
    "id, review_id, user_id, parent_reply_id, content, is_edited, created_at, updated_at";

/// Reply joined with author and counts; $1 is the viewer id (may be NULL)
const REPLY_VIEW_SELECT: &str = r#"
    SELECT
        rr.id, rr.review_id, rr.user_id, rr.parent_reply_id, rr.content,
        rr.is_edited, rr.created_at, rr.updated_at,
        u.username, u.display_name, u.avatar_url,
        COALESCE((SELECT SUM(CASE WHEN l.like_type = 'like' THEN 1 ELSE 0 END)
                  FROM reply_likes l WHERE l.reply_id = rr.id), 0) AS likes,
        COALESCE((SELECT SUM(CASE WHEN l.like_type = 'dislike' THEN 1 ELSE 0 END)
                  FROM reply_likes l WHERE l.reply_id = rr.id), 0) AS dislikes,
        (SELECT l.like_type FROM reply_likes l
         WHERE l.reply_id = rr.id AND l.user_id = $1) AS user_reaction
    FROM review_replies rr
    JOIN users u ON u.id = rr.user_id
"#;

fn db_error(context: &str, e: sqlx::Error) -> HubError {
    log::error!("{}: {}", context, e);
    HubError::DatabaseError(format!("{}: {}", context, e))
}

pub struct ReplyRepository;

impl ReplyRepository {
    pub async fn create_reply(
        pool: &SqlitePool,
        review_id: i64,
        user_id: i64,
        parent_reply_id: Option<i64>,
        content: &str,
    ) -> Result<Reply, HubError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO review_replies (review_id, user_id, parent_reply_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(review_id)
        .bind(user_id)
        .bind(parent_reply_id)
        .bind(content)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| db_error("Create reply failed", e))?;

        let reply = Self::get_by_id(pool, result.last_insert_rowid()).await?;
        log::info!(
            "Created reply {} on review {} by user {}",
            reply.id,
            review_id,
            user_id
        );
        Ok(reply)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Reply>, HubError> {
        sqlx::query_as::<_, Reply>(&format!(
            "SELECT {} FROM review_replies WHERE id = $1",
            REPLY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch reply failed", e))
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Reply, HubError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("Reply not found: {}", id)))
    }

    pub async fn get_view(
        pool: &SqlitePool,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<ReplyView, HubError> {
        sqlx::query_as::<_, ReplyView>(&format!("{} WHERE rr.id = $2", REPLY_VIEW_SELECT))
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch reply view failed", e))?
            .ok_or_else(|| HubError::NotFound(format!("Reply not found: {}", id)))
    }

    /// Every reply of a review, oldest first
    pub async fn list_by_review(
        pool: &SqlitePool,
        review_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<ReplyView>, HubError> {
        sqlx::query_as::<_, ReplyView>(&format!(
            "{} WHERE rr.review_id = $2 ORDER BY rr.created_at ASC, rr.id ASC",
            REPLY_VIEW_SELECT
        ))
        .bind(viewer_id)
        .bind(review_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("List replies failed", e))
    }

    /// Number of replies in the chain from this reply up to the review (itself included)
    pub async fn depth(pool: &SqlitePool, reply_id: i64) -> Result<i64, HubError> {
        let depth: (Option<i64>,) = sqlx::query_as(
            r#"
            WITH RECURSIVE chain(id, parent_reply_id, depth) AS (
                SELECT id, parent_reply_id, 1 FROM review_replies WHERE id = $1
                UNION ALL
                SELECT p.id, p.parent_reply_id, c.depth + 1
                FROM review_replies p
                JOIN chain c ON p.id = c.parent_reply_id
            )
            SELECT MAX(depth) FROM chain
            "#,
        )
        .bind(reply_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Reply depth failed", e))?;

        Ok(depth.0.unwrap_or(0))
    }

    pub async fn update_content(
        pool: &SqlitePool,
        id: i64,
        content: &str,
    ) -> Result<Reply, HubError> {
        sqlx::query(
            "UPDATE review_replies SET content = $2, is_edited = 1, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(content)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| db_error("Update reply failed", e))?;

        Self::get_by_id(pool, id).await
    }

    /// Delete a reply; nested replies and likes cascade
    pub async fn delete_reply(pool: &SqlitePool, id: i64) -> Result<(), HubError> {
        let result = sqlx::query("DELETE FROM review_replies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete reply failed", e))?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!("Reply not found: {}", id)));
        }

        log::info!("Deleted reply {}", id);
        Ok(())
    }
}
