// src/handlers/auth.rs
// DOCUMENTATION: HTTP handlers for registration, login and email verification
// PURPOSE: Parse requests, call AccountService, return responses

use crate::auth::{AuthUser, JwtManager};
use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::HubError;
use crate::models::{LoginRequest, RegisterRequest, ResendVerificationRequest, VerifyEmailQuery};
use crate::services::{AccountService, LoginThrottle, Mailer};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, HubError> {
    // Validate what will actually be stored
    let req = req.into_inner().normalized();
    if let Err(e) = req.validate() {
        return Err(HubError::ValidationError(e.to_string()));
    }

    let user = AccountService::register(pool.get_ref(), config.get_ref(), mailer.get_ref(), req)
        .await?;

    let message = if user.is_verified {
        "Registration successful"
    } else {
        "Registration successful. Check your email to verify your account."
    };

    Ok(HttpResponse::Created().json(json!({
        "message": message,
        "user": user,
    })))
}

/// POST /api/auth/login
pub async fn login(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    jwt: web::Data<JwtManager>,
    throttle: web::Data<Arc<LoginThrottle>>,
    req: web::Json<LoginRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    let response = AccountService::login(
        pool.get_ref(),
        config.get_ref(),
        jwt.get_ref(),
        throttle.get_ref(),
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/auth/verify-email?token=...
pub async fn verify_email(
    pool: web::Data<SqlitePool>,
    query: web::Query<VerifyEmailQuery>,
) -> Result<impl Responder, HubError> {
    let user = AccountService::verify_email(pool.get_ref(), &query.token).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Email verified. You can now log in.",
        "user": user,
    })))
}

/// POST /api/auth/resend-verification
/// Same answer whether or not the address is registered
pub async fn resend_verification(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
    req: web::Json<ResendVerificationRequest>,
) -> Result<impl Responder, HubError> {
    req.validate()?;

    AccountService::resend_verification(
        pool.get_ref(),
        config.get_ref(),
        mailer.get_ref(),
        &req.email,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "If that account exists and is unverified, a new link has been sent."
    })))
}

/// GET /api/auth/me
pub async fn me(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
) -> Result<impl Responder, HubError> {
    let user = UserRepository::get_by_id(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(user.to_private()))
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/verify-email", web::get().to(verify_email))
            .route("/resend-verification", web::post().to(resend_verification))
            .route("/me", web::get().to(me)),
    );
}
