// src/services/account_service.rs
// DOCUMENTATION: Business logic for accounts
// PURPOSE: Registration, login, email verification, profile and settings

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, AuthUser, JwtManager};
use crate::config::Config;
use crate::db::{FavoriteRepository, NewUser, ReviewRepository, UserRepository};
use crate::errors::HubError;
use crate::models::{
    ChangePasswordRequest, Favorite, LoginRequest, LoginResponse, PrivateUser, ProfileResponse,
    PublicUser, RegisterRequest, ReviewView, UpdateProfileRequest, UpdateSettingsRequest,
    UserSettings,
};
use crate::services::{moderation, LoginThrottle, Mailer};

/// Public profile page
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub user: PublicUser,
    pub review_count: i64,
    /// Present only when the owner shares favorites
    pub favorites: Option<Vec<Favorite>>,
}

pub fn new_verification_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub struct AccountService;

impl AccountService {
    /// Create an account and send the verification email
    pub async fn register(
        pool: &SqlitePool,
        config: &Config,
        mailer: &Mailer,
        req: RegisterRequest,
    ) -> Result<PrivateUser, HubError> {
        let req = req.normalized();
        let password_hash = hash_password(&req.password, config.bcrypt_cost)?;

        let needs_verification = config.require_email_verification;
        let token = needs_verification.then(new_verification_token);
        let expires_at = needs_verification
            .then(|| Utc::now() + Duration::hours(config.verification_token_ttl_hours));

        let user = UserRepository::create_user(
            pool,
            &NewUser {
                username: &req.username,
                email: &req.email,
                password_hash: &password_hash,
                verification_token: token.as_deref(),
                verification_expires_at: expires_at,
                is_verified: !needs_verification,
            },
        )
        .await?;

        if let Some(token) = token {
            // A mail outage must not lose the account; the user can ask for a resend
            if let Err(e) = mailer
                .send_verification(&user.email, &user.username, &token)
                .await
            {
                log::error!("Verification email to {} failed: {}", user.email, e);
            }
        }

        Ok(user.to_private())
    }

    /// Check credentials and issue a session token
    pub async fn login(
        pool: &SqlitePool,
        config: &Config,
        jwt: &JwtManager,
        throttle: &LoginThrottle,
        req: LoginRequest,
    ) -> Result<LoginResponse, HubError> {
        let email = req.email.trim().to_lowercase();
        throttle.check(&email)?;

        let invalid = || HubError::Unauthorized("Invalid email or password".to_string());

        let user = match UserRepository::find_by_email(pool, &email).await? {
            Some(user) => user,
            None => {
                log::warn!("Login failed for unknown email {}", email);
                return Err(invalid());
            }
        };

        if !verify_password(&req.password, &user.password_hash)? {
            log::warn!("Login failed for user {}: wrong password", user.id);
            return Err(invalid());
        }

        if user.is_banned {
            let reason = user.ban_reason.as_deref().unwrap_or("no reason given");
            return Err(HubError::Forbidden(format!(
                "Your account is banned: {}",
                reason
            )));
        }

        if config.require_email_verification && !user.is_verified {
            return Err(HubError::Forbidden(
                "Please verify your email address before logging in".to_string(),
            ));
        }

        UserRepository::touch_last_login(pool, user.id).await?;
        let (token, expires_at) = jwt.generate_token(user.id, &user.username, user.is_admin)?;
        let user = UserRepository::get_by_id(pool, user.id).await?;

        log::info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            expires_at,
            user: user.to_private(),
        })
    }

    /// Consume a verification token
    pub async fn verify_email(pool: &SqlitePool, token: &str) -> Result<PrivateUser, HubError> {
        let invalid = || HubError::InvalidInput("Invalid or expired verification link".to_string());

        let token = token.trim();
        if token.is_empty() {
            return Err(invalid());
        }

        let user = UserRepository::find_by_verification_token(pool, token)
            .await?
            .ok_or_else(invalid)?;

        let expired = user
            .verification_expires_at
            .map_or(true, |expires_at| expires_at < Utc::now());
        if expired {
            log::warn!("Expired verification token used for user {}", user.id);
            return Err(invalid());
        }

        UserRepository::mark_verified(pool, user.id).await?;
        log::info!("User {} verified their email", user.id);

        Ok(UserRepository::get_by_id(pool, user.id).await?.to_private())
    }

    /// Issue a fresh token for an unverified account; silent otherwise
    pub async fn resend_verification(
        pool: &SqlitePool,
        config: &Config,
        mailer: &Mailer,
        email: &str,
    ) -> Result<(), HubError> {
        let email = email.trim().to_lowercase();

        let Some(user) = UserRepository::find_by_email(pool, &email).await? else {
            return Ok(());
        };
        if user.is_verified {
            return Ok(());
        }

        let token = new_verification_token();
        let expires_at = Utc::now() + Duration::hours(config.verification_token_ttl_hours);
        UserRepository::set_verification_token(pool, user.id, &token, expires_at).await?;

        if let Err(e) = mailer
            .send_verification(&user.email, &user.username, &token)
            .await
        {
            log::error!("Verification email to {} failed: {}", user.email, e);
        }

        Ok(())
    }

    pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<ProfileResponse, HubError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;
        let settings = UserRepository::get_settings(pool, user_id).await?;

        Ok(ProfileResponse {
            user: user.to_private(),
            settings,
        })
    }

    pub async fn update_profile(
        pool: &SqlitePool,
        user: &AuthUser,
        req: UpdateProfileRequest,
    ) -> Result<PrivateUser, HubError> {
        user.ensure_not_banned()?;

        let req = UpdateProfileRequest {
            display_name: req
                .display_name
                .map(|name| moderation::strip_html(&name)),
            bio: req.bio.map(|bio| moderation::strip_html(&bio)),
            avatar_url: req.avatar_url.map(|url| url.trim().to_string()),
        };

        let updated = UserRepository::update_profile(pool, user.id, &req).await?;
        Ok(updated.to_private())
    }

    pub async fn change_password(
        pool: &SqlitePool,
        config: &Config,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), HubError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;

        if !verify_password(&req.current_password, &user.password_hash)? {
            return Err(HubError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(&req.new_password, config.bcrypt_cost)?;
        UserRepository::update_password(pool, user_id, &password_hash).await?;

        log::info!("User {} changed their password", user_id);
        Ok(())
    }

    pub async fn delete_account(
        pool: &SqlitePool,
        user_id: i64,
        password: &str,
    ) -> Result<(), HubError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;

        if !verify_password(password, &user.password_hash)? {
            return Err(HubError::Unauthorized("Password is incorrect".to_string()));
        }

        UserRepository::delete_user(pool, user_id).await
    }

    pub async fn get_settings(pool: &SqlitePool, user_id: i64) -> Result<UserSettings, HubError> {
        UserRepository::get_settings(pool, user_id).await
    }

    pub async fn update_settings(
        pool: &SqlitePool,
        user_id: i64,
        req: UpdateSettingsRequest,
    ) -> Result<UserSettings, HubError> {
        UserRepository::update_settings(pool, user_id, &req).await
    }

    /// Profile as seen by other visitors
    pub async fn public_profile(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<PublicProfileResponse, HubError> {
        let not_found = || HubError::NotFound(format!("User not found: {}", username));

        let user = UserRepository::find_by_username(pool, username)
            .await?
            .ok_or_else(not_found)?;
        let settings = UserRepository::get_settings(pool, user.id).await?;

        if !settings.public_profile {
            return Err(not_found());
        }

        let review_count = ReviewRepository::count_by_user(pool, user.id).await?;
        let favorites = if settings.show_favorites {
            Some(FavoriteRepository::list_by_user(pool, user.id).await?)
        } else {
            None
        };

        Ok(PublicProfileResponse {
            user: user.to_public(),
            review_count,
            favorites,
        })
    }

    pub async fn my_reviews(pool: &SqlitePool, user_id: i64) -> Result<Vec<ReviewView>, HubError> {
        ReviewRepository::list_by_user(pool, user_id, Some(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_tokens_are_unique() {
        let a = new_verification_token();
        let b = new_verification_token();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
