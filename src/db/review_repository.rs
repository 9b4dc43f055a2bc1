// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle CRUD operations and aggregate queries for fragrance reviews

use crate::db::is_unique_violation;
use crate::errors::HubError;
use crate::models::{Review, ReviewSort, ReviewView};
use chrono::Utc;
use sqlx::SqlitePool;

/// Review joined with author and counts; $1 is the viewer id (may be NULL)
const REVIEW_VIEW_SELECT: &str = r#"
    SELECT
        r.id, r.user_id, r.fragrance_name, r.rating, r.title, r.content,
        r.is_edited, r.created_at, r.updated_at,
        u.username, u.display_name, u.avatar_url,
        COALESCE((SELECT SUM(CASE WHEN l.like_type = 'like' THEN 1 ELSE 0 END)
                  FROM review_likes l WHERE l.review_id = r.id), 0) AS likes,
        COALESCE((SELECT SUM(CASE WHEN l.like_type = 'dislike' THEN 1 ELSE 0 END)
                  FROM review_likes l WHERE l.review_id = r.id), 0) AS dislikes,
        (SELECT COUNT(*) FROM review_replies rr WHERE rr.review_id = r.id) AS reply_count,
        (SELECT l.like_type FROM review_likes l
         WHERE l.review_id = r.id AND l.user_id = $1) AS user_reaction
    FROM reviews r
    JOIN users u ON u.id = r.user_id
"#;

const REVIEW_COLUMNS: &str =
    "id, user_id, fragrance_name, rating, title, content, is_edited, created_at, updated_at";

fn db_error(context: &str, e: sqlx::Error) -> HubError {
    log::error!("{}: {}", context, e);
    HubError::DatabaseError(format!("{}: {}", context, e))
}

/// Values for a new review after sanitizing
pub struct NewReview<'a> {
    pub user_id: i64,
    pub fragrance_name: &'a str,
    pub rating: i64,
    pub title: Option<&'a str>,
    pub content: &'a str,
}

pub struct ReviewRepository;

impl ReviewRepository {
    /// Create a new review
    /// DOCUMENTATION: One review per user per fragrance; repeats are a conflict
    pub async fn create_review(
        pool: &SqlitePool,
        new_review: &NewReview<'_>,
    ) -> Result<Review, HubError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (user_id, fragrance_name, rating, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(new_review.user_id)
        .bind(new_review.fragrance_name)
        .bind(new_review.rating)
        .bind(new_review.title)
        .bind(new_review.content)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HubError::AlreadyExists(format!(
                    "You have already reviewed {}",
                    new_review.fragrance_name
                ))
            } else {
                db_error("Create review failed", e)
            }
        })?;

        let review = Self::get_by_id(pool, result.last_insert_rowid()).await?;
        log::info!(
            "Created review {} for {} by user {}",
            review.id,
            review.fragrance_name,
            review.user_id
        );
        Ok(review)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Review>, HubError> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch review failed", e))
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Review, HubError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("Review not found: {}", id)))
    }

    pub async fn get_view(
        pool: &SqlitePool,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<ReviewView, HubError> {
        sqlx::query_as::<_, ReviewView>(&format!("{} WHERE r.id = $2", REVIEW_VIEW_SELECT))
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch review view failed", e))?
            .ok_or_else(|| HubError::NotFound(format!("Review not found: {}", id)))
    }

    /// Page of reviews for a fragrance (name compared case-insensitively)
    pub async fn list_by_fragrance(
        pool: &SqlitePool,
        fragrance_name: &str,
        sort: ReviewSort,
        limit: i64,
        offset: i64,
        viewer_id: Option<i64>,
    ) -> Result<(Vec<ReviewView>, i64), HubError> {
        let reviews = sqlx::query_as::<_, ReviewView>(&format!(
            "{} WHERE r.fragrance_name = $2 COLLATE NOCASE ORDER BY {} LIMIT $3 OFFSET $4",
            REVIEW_VIEW_SELECT,
            sort.order_by()
        ))
        .bind(viewer_id)
        .bind(fragrance_name)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("List reviews failed", e))?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE fragrance_name = $1 COLLATE NOCASE",
        )
        .bind(fragrance_name)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Count reviews failed", e))?;

        Ok((reviews, total.0))
    }

    /// All reviews written by one user, newest first
    pub async fn list_by_user(
        pool: &SqlitePool,
        user_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<ReviewView>, HubError> {
        sqlx::query_as::<_, ReviewView>(&format!(
            "{} WHERE r.user_id = $2 ORDER BY r.created_at DESC, r.id DESC",
            REVIEW_VIEW_SELECT
        ))
        .bind(viewer_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("List user reviews failed", e))
    }

    pub async fn count_by_user(pool: &SqlitePool, user_id: i64) -> Result<i64, HubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count user reviews failed", e))?;

        Ok(count.0)
    }

    /// Apply present fields and flag the review as edited
    pub async fn update_review(
        pool: &SqlitePool,
        id: i64,
        rating: Option<i64>,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Review, HubError> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET rating = COALESCE($2, rating),
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                is_edited = 1,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| db_error("Update review failed", e))?;

        Self::get_by_id(pool, id).await
    }

    /// Delete a review; likes and replies cascade
    pub async fn delete_review(pool: &SqlitePool, id: i64) -> Result<(), HubError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete review failed", e))?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!("Review not found: {}", id)));
        }

        log::info!("Deleted review {}", id);
        Ok(())
    }

    /// Review count, average rating and per-star distribution
    pub async fn summary(
        pool: &SqlitePool,
        fragrance_name: &str,
    ) -> Result<(i64, Option<f64>, [i64; 5]), HubError> {
        let (count, average): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(rating)
            FROM reviews
            WHERE fragrance_name = $1 COLLATE NOCASE
            "#,
        )
        .bind(fragrance_name)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Review summary failed", e))?;

        let buckets: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT rating, COUNT(*)
            FROM reviews
            WHERE fragrance_name = $1 COLLATE NOCASE
            GROUP BY rating
            "#,
        )
        .bind(fragrance_name)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Rating distribution failed", e))?;

        let mut distribution = [0i64; 5];
        for (rating, n) in buckets {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] = n;
            }
        }

        Ok((count, average, distribution))
    }
}
