// src/services/review_service.rs
// DOCUMENTATION: Business logic for reviews
// PURPOSE: Ownership checks, content cleanup and reaction toggling around ReviewRepository

use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::db::{NewReview, ReactionRepository, ReactionTarget, ReviewRepository};
use crate::errors::HubError;
use crate::models::{
    CreateReviewRequest, ReviewListQuery, ReviewListResponse, ReviewReactionRequest,
    ReviewReactionResponse, ReviewSummary, ReviewView, UpdateReviewRequest,
};
use crate::services::moderation;

pub const REVIEW_MIN_CHARS: usize = 10;
pub const REVIEW_MAX_CHARS: usize = 2000;

pub struct ReviewService;

impl ReviewService {
    pub async fn list_reviews(
        pool: &SqlitePool,
        query: ReviewListQuery,
        viewer_id: Option<i64>,
    ) -> Result<ReviewListResponse, HubError> {
        let fragrance = query.fragrance.trim();
        if fragrance.is_empty() {
            return Err(HubError::InvalidInput("fragrance is required".to_string()));
        }

        let limit = query.limit();
        let page = query.page();
        let (data, total_count) = ReviewRepository::list_by_fragrance(
            pool,
            fragrance,
            query.sort,
            limit,
            query.offset(),
            viewer_id,
        )
        .await?;

        Ok(ReviewListResponse {
            data,
            total_count,
            page,
            limit,
            has_more: total_count > page * limit,
        })
    }

    pub async fn summary(pool: &SqlitePool, fragrance: &str) -> Result<ReviewSummary, HubError> {
        let fragrance = fragrance.trim();
        if fragrance.is_empty() {
            return Err(HubError::InvalidInput("fragrance is required".to_string()));
        }

        let (review_count, average, distribution) =
            ReviewRepository::summary(pool, fragrance).await?;

        Ok(ReviewSummary {
            fragrance_name: fragrance.to_string(),
            review_count,
            // One decimal place
            average_rating: average.map(|a| (a * 10.0).round() / 10.0),
            distribution,
        })
    }

    pub async fn create_review(
        pool: &SqlitePool,
        user: &AuthUser,
        req: CreateReviewRequest,
    ) -> Result<ReviewView, HubError> {
        user.ensure_not_banned()?;

        let content = moderation::clean_text(
            &req.content,
            "content",
            REVIEW_MIN_CHARS,
            REVIEW_MAX_CHARS,
        )?;
        let title = req
            .title
            .as_deref()
            .map(moderation::strip_html)
            .filter(|t| !t.is_empty());
        let fragrance_name = req.fragrance_name.trim();
        if fragrance_name.is_empty() {
            return Err(HubError::ValidationError(
                "fragrance_name is required".to_string(),
            ));
        }

        let review = ReviewRepository::create_review(
            pool,
            &NewReview {
                user_id: user.id,
                fragrance_name,
                rating: req.rating,
                title: title.as_deref(),
                content: &content,
            },
        )
        .await?;

        ReviewRepository::get_view(pool, review.id, Some(user.id)).await
    }

    pub async fn update_review(
        pool: &SqlitePool,
        user: &AuthUser,
        review_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<ReviewView, HubError> {
        user.ensure_not_banned()?;

        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        if review.user_id != user.id {
            return Err(HubError::Forbidden(
                "You can only edit your own reviews".to_string(),
            ));
        }

        let content = req
            .content
            .as_deref()
            .map(|c| moderation::clean_text(c, "content", REVIEW_MIN_CHARS, REVIEW_MAX_CHARS))
            .transpose()?;
        let title = req.title.as_deref().map(moderation::strip_html);

        ReviewRepository::update_review(
            pool,
            review_id,
            req.rating,
            title.as_deref(),
            content.as_deref(),
        )
        .await?;

        ReviewRepository::get_view(pool, review_id, Some(user.id)).await
    }

    pub async fn delete_review(
        pool: &SqlitePool,
        user: &AuthUser,
        review_id: i64,
    ) -> Result<(), HubError> {
        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        if !user.can_moderate(review.user_id) {
            return Err(HubError::Forbidden(
                "You can only delete your own reviews".to_string(),
            ));
        }

        if review.user_id != user.id {
            log::info!("Admin {} removed review {}", user.id, review_id);
        }
        ReviewRepository::delete_review(pool, review_id).await
    }

    pub async fn react(
        pool: &SqlitePool,
        user: &AuthUser,
        req: ReviewReactionRequest,
    ) -> Result<ReviewReactionResponse, HubError> {
        user.ensure_not_banned()?;

        // 404 before touching review_likes
        ReviewRepository::get_by_id(pool, req.review_id).await?;

        let counts = ReactionRepository::toggle(
            pool,
            ReactionTarget::Review,
            req.review_id,
            user.id,
            req.like_type,
        )
        .await?;

        Ok(ReviewReactionResponse {
            review_id: req.review_id,
            counts,
        })
    }
}
