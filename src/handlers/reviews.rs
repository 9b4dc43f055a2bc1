// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for fragrance reviews and their reply threads
// PURPOSE: Parse requests, call ReviewService/ReplyService, return responses

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::errors::HubError;
use crate::models::{
    CreateReplyRequest, CreateReviewRequest, ReviewListQuery, ReviewReactionRequest,
    ReviewSummaryQuery, UpdateReviewRequest,
};
use crate::services::{ReplyCooldown, ReplyService, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// GET /api/reviews?fragrance=...&sort=...&page=...&limit=...
pub async fn list_reviews(
    pool: web::Data<SqlitePool>,
    viewer: MaybeAuthUser,
    query: web::Query<ReviewListQuery>,
) -> Result<impl Responder, HubError> {
    let result = ReviewService::list_reviews(pool.get_ref(), query.into_inner(), viewer.id()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/reviews/summary?fragrance=...
pub async fn review_summary(
    pool: web::Data<SqlitePool>,
    query: web::Query<ReviewSummaryQuery>,
) -> Result<impl Responder, HubError> {
    let summary = ReviewService::summary(pool.get_ref(), &query.fragrance).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /api/reviews
pub async fn create_review(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, HubError> {
    if let Err(e) = req.validate() {
        return Err(HubError::ValidationError(e.to_string()));
    }

    let review = ReviewService::create_review(pool.get_ref(), &user, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

/// PUT /api/reviews/{id}
pub async fn update_review(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    req: web::Json<UpdateReviewRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    let review =
        ReviewService::update_review(pool.get_ref(), &user, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(review))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    ReviewService::delete_review(pool.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/reviews/like
/// Same reaction twice removes it; the other reaction switches it
pub async fn react_to_review(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<ReviewReactionRequest>,
) -> Result<impl Responder, HubError> {
    let result = ReviewService::react(pool.get_ref(), &user, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/reviews/{id}/replies
pub async fn list_replies(
    pool: web::Data<SqlitePool>,
    viewer: MaybeAuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    let thread = ReplyService::thread(pool.get_ref(), path.into_inner(), viewer.id()).await?;
    Ok(HttpResponse::Ok().json(thread))
}

/// POST /api/reviews/{id}/replies
pub async fn create_reply(
    pool: web::Data<SqlitePool>,
    cooldown: web::Data<Arc<ReplyCooldown>>,
    user: AuthUser,
    path: web::Path<i64>,
    req: web::Json<CreateReplyRequest>,
) -> Result<impl Responder, HubError> {
    let reply = ReplyService::create_reply(
        pool.get_ref(),
        cooldown.get_ref(),
        &user,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(reply))
}

/// Configuration for review routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reviews")
            .route("", web::get().to(list_reviews))
            .route("", web::post().to(create_review))
            .route("/summary", web::get().to(review_summary))
            .route("/like", web::post().to(react_to_review))
            .route("/{id}", web::put().to(update_review))
            .route("/{id}", web::delete().to(delete_review))
            .route("/{id}/replies", web::get().to(list_replies))
            .route("/{id}/replies", web::post().to(create_reply)),
    );
}
