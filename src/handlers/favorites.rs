// src/handlers/favorites.rs
// DOCUMENTATION: HTTP handlers for a user's favorite fragrances

use crate::auth::AuthUser;
use crate::db::FavoriteRepository;
use crate::errors::HubError;
use crate::models::{AddFavoriteRequest, FavoriteCheckResponse};
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// GET /api/favorites
pub async fn list_favorites(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> Result<impl Responder, HubError> {
    let favorites = FavoriteRepository::list_by_user(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

/// POST /api/favorites
pub async fn add_favorite(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    req: web::Json<AddFavoriteRequest>,
) -> Result<impl Responder, HubError> {
    if let Err(e) = req.validate() {
        return Err(HubError::ValidationError(e.to_string()));
    }

    let favorite = FavoriteRepository::add_favorite(pool.get_ref(), user.id, &req).await?;
    Ok(HttpResponse::Created().json(favorite))
}

/// DELETE /api/favorites/{fragrance_name}
pub async fn remove_favorite(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<impl Responder, HubError> {
    FavoriteRepository::remove_favorite(pool.get_ref(), user.id, path.trim()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/favorites/check/{fragrance_name}
pub async fn check_favorite(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<impl Responder, HubError> {
    let fragrance_name = path.into_inner().trim().to_string();
    let is_favorite = FavoriteRepository::is_favorite(pool.get_ref(), user.id, &fragrance_name).await?;

    Ok(HttpResponse::Ok().json(FavoriteCheckResponse {
        fragrance_name,
        is_favorite,
    }))
}

/// Configuration for favorite routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/favorites")
            .route("", web::get().to(list_favorites))
            .route("", web::post().to(add_favorite))
            .route("/check/{fragrance_name}", web::get().to(check_favorite))
            .route("/{fragrance_name}", web::delete().to(remove_favorite)),
    );
}
