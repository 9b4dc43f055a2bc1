// src/handlers/replies.rs
// DOCUMENTATION: HTTP handlers addressing a single reply

use crate::auth::AuthUser;
use crate::errors::HubError;
use crate::models::{ReactionRequest, UpdateReplyRequest};
use crate::services::ReplyService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;

/// PUT /api/replies/{id}
pub async fn update_reply(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    req: web::Json<UpdateReplyRequest>,
) -> Result<impl Responder, HubError> {
    let reply =
        ReplyService::update_reply(pool.get_ref(), &user, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// DELETE /api/replies/{id}
pub async fn delete_reply(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    ReplyService::delete_reply(pool.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/replies/{id}/like
pub async fn react_to_reply(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    req: web::Json<ReactionRequest>,
) -> Result<impl Responder, HubError> {
    let result =
        ReplyService::react(pool.get_ref(), &user, path.into_inner(), req.like_type).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/replies")
            .route("/{id}", web::put().to(update_reply))
            .route("/{id}", web::delete().to(delete_reply))
            .route("/{id}/like", web::post().to(react_to_reply)),
    );
}
