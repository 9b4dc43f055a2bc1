// src/handlers/profile.rs
// DOCUMENTATION: HTTP handlers for the caller's profile, settings and public profiles

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::AvatarRepository;
use crate::errors::HubError;
use crate::models::{
    ChangePasswordRequest, DeleteAccountRequest, UpdateProfileRequest, UpdateSettingsRequest,
};
use crate::services::{
    resize_avatar, AccountService, AVATAR_CONTENT_TYPE, AVATAR_SIZE, MAX_AVATAR_UPLOAD_BYTES,
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

/// GET /api/profile
pub async fn get_profile(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> Result<impl Responder, HubError> {
    let profile = AccountService::get_profile(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/profile
pub async fn update_profile(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    let updated = AccountService::update_profile(pool.get_ref(), &user, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/profile
pub async fn delete_account(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<DeleteAccountRequest>,
) -> Result<impl Responder, HubError> {
    AccountService::delete_account(pool.get_ref(), user.id, &req.password).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/profile/password
pub async fn change_password(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    user: AuthUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    AccountService::change_password(pool.get_ref(), config.get_ref(), user.id, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}

/// GET /api/profile/settings
pub async fn get_settings(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> Result<impl Responder, HubError> {
    let settings = AccountService::get_settings(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// PUT /api/profile/settings
pub async fn update_settings(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<UpdateSettingsRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    let settings = AccountService::update_settings(pool.get_ref(), user.id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// PUT /api/profile/avatar
/// Body is the raw image; it is cropped to a square, resized and stored as PNG
pub async fn upload_avatar(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Bytes,
) -> Result<impl Responder, HubError> {
    user.ensure_not_banned()?;

    // Decoding and resampling are CPU-bound
    let png = web::block(move || resize_avatar(&body))
        .await
        .map_err(|e| {
            log::error!("Avatar worker failed: {}", e);
            HubError::InternalError
        })??;

    let avatar_url =
        AvatarRepository::save(pool.get_ref(), user.id, AVATAR_CONTENT_TYPE, &png).await?;

    Ok(HttpResponse::Ok().json(json!({
        "avatar_url": avatar_url,
        "width": AVATAR_SIZE,
        "height": AVATAR_SIZE,
    })))
}

/// GET /api/avatars/{user_id}
pub async fn get_avatar(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<impl Responder, HubError> {
    let user_id = path.into_inner();
    let avatar = AvatarRepository::find(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| HubError::NotFound(format!("No avatar for user {}", user_id)))?;

    Ok(HttpResponse::Ok()
        .content_type(avatar.content_type)
        .insert_header(("Cache-Control", "public, max-age=300"))
        .body(avatar.data))
}

/// GET /api/profile/reviews
pub async fn my_reviews(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> Result<impl Responder, HubError> {
    let reviews = AccountService::my_reviews(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /api/users/{username}
pub async fn public_profile(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, HubError> {
    let profile = AccountService::public_profile(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Configuration for profile routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/profile")
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile))
            .route("", web::delete().to(delete_account))
            .route("/password", web::put().to(change_password))
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(update_settings))
            .route("/reviews", web::get().to(my_reviews))
            .service(
                web::resource("/avatar")
                    .app_data(web::PayloadConfig::new(MAX_AVATAR_UPLOAD_BYTES))
                    .route(web::put().to(upload_avatar)),
            ),
    )
    .route("/api/users/{username}", web::get().to(public_profile))
    .route("/api/avatars/{user_id}", web::get().to(get_avatar));
}
