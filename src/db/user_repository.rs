// src/db/user_repository.rs
// DOCUMENTATION: User and settings database operations
// PURPOSE: Accounts, verification tokens, bans, profile and settings updates

use crate::errors::HubError;
use crate::models::{UpdateProfileRequest, UpdateSettingsRequest, User, UserSettings};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, display_name, bio, avatar_url,
    is_verified, verification_token, verification_expires_at,
    is_admin, is_banned, ban_reason, banned_at, last_login_at,
    created_at, updated_at
"#;

/// Values needed to insert a new account
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub verification_token: Option<&'a str>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct SiteStats {
    pub users: i64,
    pub banned_users: i64,
    pub reviews: i64,
    pub replies: i64,
    pub favorites: i64,
}

fn db_error(context: &str, e: sqlx::Error) -> HubError {
    log::error!("{}: {}", context, e);
    HubError::DatabaseError(format!("{}: {}", context, e))
}

/// True when the error is a UNIQUE constraint violation
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

pub struct UserRepository;

impl UserRepository {
    /// Insert a user and its default settings row in one transaction
    /// DOCUMENTATION: Duplicate email or username surfaces as InvalidInput
    pub async fn create_user(pool: &SqlitePool, new_user: &NewUser<'_>) -> Result<User, HubError> {
        let now = Utc::now();
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                username, email, password_hash, is_verified,
                verification_token, verification_expires_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.is_verified)
        .bind(new_user.verification_token)
        .bind(new_user.verification_expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                log::warn!("Registration rejected for duplicate account: {}", new_user.email);
                HubError::InvalidInput("Email or username is already registered".to_string())
            } else {
                db_error("Create user failed", e)
            }
        })?;

        let user_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO user_settings (user_id, updated_at) VALUES ($1, $2)")
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Create settings failed", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        log::info!("Created user {} ({})", new_user.username, user_id);
        Self::get_by_id(pool, user_id).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, HubError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch user failed", e))
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<User, HubError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("User not found: {}", id)))
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, HubError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch user by email failed", e))
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, HubError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch user by username failed", e))
    }

    pub async fn find_by_verification_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<User>, HubError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE verification_token = $1",
            USER_COLUMNS
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch user by token failed", e))
    }

    /// Mark the account verified and clear its token
    pub async fn mark_verified(pool: &SqlitePool, id: i64) -> Result<(), HubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = 1, verification_token = NULL,
                verification_expires_at = NULL, updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| db_error("Verify user failed", e))?;

        Ok(())
    }

    pub async fn set_verification_token(
        pool: &SqlitePool,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), HubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_token = $2, verification_expires_at = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| db_error("Set verification token failed", e))?;

        Ok(())
    }

    pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> Result<(), HubError> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| db_error("Update last login failed", e))?;

        Ok(())
    }

    /// Apply the fields present in the request
    pub async fn update_profile(
        pool: &SqlitePool,
        id: i64,
        req: &UpdateProfileRequest,
    ) -> Result<User, HubError> {
        sqlx::query(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.display_name)
        .bind(&req.bio)
        .bind(&req.avatar_url)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| db_error("Update profile failed", e))?;

        Self::get_by_id(pool, id).await
    }

    pub async fn update_password(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), HubError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| db_error("Update password failed", e))?;

        Ok(())
    }

    /// Delete an account; reviews, replies, likes and favorites cascade
    pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<(), HubError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete user failed", e))?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!("User not found: {}", id)));
        }

        log::info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn set_admin(pool: &SqlitePool, id: i64, is_admin: bool) -> Result<(), HubError> {
        sqlx::query("UPDATE users SET is_admin = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(is_admin)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| db_error("Update admin flag failed", e))?;

        Ok(())
    }

    /// Ban (Some(reason)) or unban (None) a user
    pub async fn set_ban(
        pool: &SqlitePool,
        id: i64,
        reason: Option<&str>,
    ) -> Result<User, HubError> {
        let now = Utc::now();
        let banned_at = reason.map(|_| now);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_banned = $2, ban_reason = $3, banned_at = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason.is_some())
        .bind(reason)
        .bind(banned_at)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| db_error("Update ban failed", e))?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!("User not found: {}", id)));
        }

        Self::get_by_id(pool, id).await
    }

    /// List users for the admin panel, optionally filtered by ban state
    pub async fn list_users(
        pool: &SqlitePool,
        banned: Option<bool>,
    ) -> Result<Vec<User>, HubError> {
        // A NULL filter matches every user
        let sql = format!(
            "SELECT {} FROM users WHERE ($1 IS NULL OR is_banned = $1) ORDER BY created_at DESC, id DESC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(banned)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List users failed", e))
    }

    pub async fn get_settings(pool: &SqlitePool, user_id: i64) -> Result<UserSettings, HubError> {
        // Accounts created before user_settings existed get a row lazily
        sqlx::query("INSERT OR IGNORE INTO user_settings (user_id, updated_at) VALUES ($1, $2)")
            .bind(user_id)
            .bind(Utc::now())
            .execute(pool)
            .await
            .map_err(|e| db_error("Ensure settings failed", e))?;

        sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT user_id, email_notifications, public_profile, show_favorites, theme, updated_at
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Fetch settings failed", e))
    }

    pub async fn update_settings(
        pool: &SqlitePool,
        user_id: i64,
        req: &UpdateSettingsRequest,
    ) -> Result<UserSettings, HubError> {
        // Make sure the row exists before updating it
        Self::get_settings(pool, user_id).await?;

        sqlx::query(
            r#"
            UPDATE user_settings
            SET email_notifications = COALESCE($2, email_notifications),
                public_profile = COALESCE($3, public_profile),
                show_favorites = COALESCE($4, show_favorites),
                theme = COALESCE($5, theme),
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(req.email_notifications)
        .bind(req.public_profile)
        .bind(req.show_favorites)
        .bind(&req.theme)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_check_violation()) {
                HubError::ValidationError("theme must be 'light' or 'dark'".to_string())
            } else {
                db_error("Update settings failed", e)
            }
        })?;

        Self::get_settings(pool, user_id).await
    }

    pub async fn site_stats(pool: &SqlitePool) -> Result<SiteStats, HubError> {
        sqlx::query_as::<_, SiteStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM users WHERE is_banned = 1) AS banned_users,
                (SELECT COUNT(*) FROM reviews) AS reviews,
                (SELECT COUNT(*) FROM review_replies) AS replies,
                (SELECT COUNT(*) FROM user_favorites) AS favorites
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Fetch stats failed", e))
    }
}
