// src/models/user.rs
// DOCUMENTATION: User accounts, settings and auth DTOs
// PURPOSE: Rows from users/user_settings plus request/response shapes

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

/// Full user row
/// DOCUMENTATION: Never serialized directly; use to_public()/to_private()
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields anyone may see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields only the account owner sees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Admin listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }

    pub fn to_private(&self) -> PrivateUser {
        PrivateUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            is_verified: self.is_verified,
            is_admin: self.is_admin,
            is_banned: self.is_banned,
            ban_reason: self.ban_reason.clone(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }

    pub fn to_admin_view(&self) -> AdminUserView {
        AdminUserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            is_verified: self.is_verified,
            is_admin: self.is_admin,
            is_banned: self.is_banned,
            ban_reason: self.ban_reason.clone(),
            banned_at: self.banned_at,
            created_at: self.created_at,
        }
    }
}

/// Per-user preferences
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub email_notifications: bool,
    pub public_profile: bool,
    pub show_favorites: bool,
    pub theme: String,
    pub updated_at: DateTime<Utc>,
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex"))
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    match theme {
        "light" | "dark" => Ok(()),
        _ => Err(ValidationError::new("theme")),
    }
}

/// POST /api/auth/register body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30), custom = "validate_username")]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl RegisterRequest {
    /// Trim username, trim and lowercase email
    pub fn normalized(self) -> Self {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

/// POST /api/auth/login body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: PrivateUser,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email)]
    pub email: String,
}

/// PUT /api/profile body; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50))]
    pub display_name: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// PUT /api/profile/settings body
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub email_notifications: Option<bool>,
    pub public_profile: Option<bool>,
    pub show_favorites: Option<bool>,

    #[validate(custom = "validate_theme")]
    pub theme: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PrivateUser,
    pub settings: UserSettings,
}
