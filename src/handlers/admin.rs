// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for user bans and content moderation
// PURPOSE: Expose moderation via REST endpoints, admin JWT required

use crate::auth::AuthUser;
use crate::db::UserRepository;
use crate::errors::HubError;
use crate::models::AdminUserView;
use crate::services::{ReplyCooldown, ReplyService, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// Query for the user listing
#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    /// true: only banned users, false: only active users, absent: everyone
    pub banned: Option<bool>,
}

/// Request body for the ban endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct BanRequest {
    #[validate(length(min = 1, max = 500, message = "Ban reason must be 1-500 characters"))]
    pub reason: String,
}

/// GET /api/admin/users?banned=true|false
pub async fn list_users(
    pool: web::Data<SqlitePool>,
    admin: AuthUser,
    query: web::Query<AdminUsersQuery>,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;

    let users: Vec<AdminUserView> = UserRepository::list_users(pool.get_ref(), query.banned)
        .await?
        .iter()
        .map(|u| u.to_admin_view())
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total_count": users.len(),
        "users": users,
    })))
}

/// POST /api/admin/users/{id}/ban
///
/// DOCUMENTATION: Admins cannot ban themselves or other admins
pub async fn ban_user(
    pool: web::Data<SqlitePool>,
    admin: AuthUser,
    path: web::Path<i64>,
    req: web::Json<BanRequest>,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;
    let req = BanRequest {
        reason: req.into_inner().reason.trim().to_string(),
    };
    req.validate()?;

    let target_id = path.into_inner();
    if target_id == admin.id {
        return Err(HubError::InvalidInput("You cannot ban yourself".to_string()));
    }

    let target = UserRepository::get_by_id(pool.get_ref(), target_id).await?;
    if target.is_admin {
        return Err(HubError::InvalidInput(
            "Administrators cannot be banned".to_string(),
        ));
    }

    let reason = req.reason.as_str();
    let user = UserRepository::set_ban(pool.get_ref(), target_id, Some(reason)).await?;

    log::warn!(
        "Admin {} banned user {} ({}): {}",
        admin.id,
        user.id,
        user.username,
        reason
    );

    Ok(HttpResponse::Ok().json(user.to_admin_view()))
}

/// POST /api/admin/users/{id}/unban
pub async fn unban_user(
    pool: web::Data<SqlitePool>,
    admin: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;

    let user = UserRepository::set_ban(pool.get_ref(), path.into_inner(), None).await?;
    log::info!("Admin {} lifted ban on user {}", admin.id, user.id);

    Ok(HttpResponse::Ok().json(user.to_admin_view()))
}

/// DELETE /api/admin/reviews/{id}
pub async fn delete_review(
    pool: web::Data<SqlitePool>,
    admin: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;
    ReviewService::delete_review(pool.get_ref(), &admin, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/admin/replies/{id}
pub async fn delete_reply(
    pool: web::Data<SqlitePool>,
    admin: AuthUser,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;
    ReplyService::delete_reply(pool.get_ref(), &admin, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/stats
/// Site counts plus the state of the in-memory reply cooldown
pub async fn site_stats(
    pool: web::Data<SqlitePool>,
    cooldown: web::Data<Arc<ReplyCooldown>>,
    admin: AuthUser,
) -> Result<impl Responder, HubError> {
    admin.ensure_admin()?;

    let stats = UserRepository::site_stats(pool.get_ref()).await?;
    let cooldown_stats = cooldown.stats().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": stats.users,
        "banned_users": stats.banned_users,
        "reviews": stats.reviews,
        "replies": stats.replies,
        "favorites": stats.favorites,
        "reply_cooldown": cooldown_stats,
    })))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/ban", web::post().to(ban_user))
            .route("/users/{id}/unban", web::post().to(unban_user))
            .route("/reviews/{id}", web::delete().to(delete_review))
            .route("/replies/{id}", web::delete().to(delete_reply))
            .route("/stats", web::get().to(site_stats)),
    );
}
