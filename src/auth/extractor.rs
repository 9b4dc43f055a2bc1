// src/auth/extractor.rs
// DOCUMENTATION: Request extractors for authenticated handlers
// PURPOSE: Turn "Authorization: Bearer <jwt>" into the current user row

use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use sqlx::SqlitePool;

use crate::auth::JwtManager;
use crate::db::UserRepository;
use crate::errors::HubError;

/// The caller, loaded fresh from the database on every request
/// so bans and admin changes apply without waiting for token expiry
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
}

impl AuthUser {
    /// Reject banned users from write actions
    pub fn ensure_not_banned(&self) -> Result<(), HubError> {
        if self.is_banned {
            log::warn!("Banned user {} attempted a write action", self.id);
            let reason = self.ban_reason.as_deref().unwrap_or("no reason given");
            return Err(HubError::Forbidden(format!(
                "Your account is banned: {}",
                reason
            )));
        }
        Ok(())
    }

    pub fn ensure_admin(&self) -> Result<(), HubError> {
        if !self.is_admin {
            log::warn!("Non-admin user {} attempted an admin action", self.id);
            return Err(HubError::Forbidden("Admin access required".to_string()));
        }
        Ok(())
    }

    /// Owners may always act; admins may act on anyone's content
    pub fn can_moderate(&self, owner_id: i64) -> bool {
        self.id == owner_id || self.is_admin
    }
}

/// Extract the token from an Authorization header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn load_user(
    token: String,
    jwt: Option<web::Data<JwtManager>>,
    pool: Option<web::Data<SqlitePool>>,
) -> Result<AuthUser, HubError> {
    let (jwt, pool) = match (jwt, pool) {
        (Some(jwt), Some(pool)) => (jwt, pool),
        _ => {
            log::error!("JwtManager or database pool missing from app data");
            return Err(HubError::InternalError);
        }
    };

    let claims = jwt.verify_token(&token)?;
    let user = UserRepository::find_by_id(pool.get_ref(), claims.user_id()?)
        .await?
        .ok_or_else(|| HubError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        is_banned: user.is_banned,
        ban_reason: user.ban_reason,
    })
}

impl FromRequest for AuthUser {
    type Error = HubError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let jwt = req.app_data::<web::Data<JwtManager>>().cloned();
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();

        Box::pin(async move {
            let token = token
                .ok_or_else(|| HubError::Unauthorized("Authentication required".to_string()))?;
            load_user(token, jwt, pool).await
        })
    }
}

/// Optional caller for public endpoints; a bad or missing token yields None
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequest for MaybeAuthUser {
    type Error = HubError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let jwt = req.app_data::<web::Data<JwtManager>>().cloned();
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();

        Box::pin(async move {
            let Some(token) = token else {
                return Ok(MaybeAuthUser(None));
            };

            match load_user(token, jwt, pool).await {
                Ok(user) => Ok(MaybeAuthUser(Some(user))),
                Err(HubError::Unauthorized(_)) => Ok(MaybeAuthUser(None)),
                Err(other) => Err(other),
            }
        })
    }
}
