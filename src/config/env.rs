// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Secret used when JWT_SECRET is not set; refused in production
pub const DEV_JWT_SECRET: &str = "fragrance-hub-dev-secret-change-me";

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    /// Format: sqlite:path/to/file.db or sqlite::memory:
    pub database_url: String,

    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 3000)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// HMAC secret for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_expires_in_secs: i64,

    /// bcrypt work factor (4..=31)
    pub bcrypt_cost: u32,

    /// Public URL of the site, used to build verification links
    pub public_base_url: String,

    /// Transactional mail endpoint; empty means links are only logged
    pub mail_api_url: String,

    /// Bearer key for the mail endpoint
    pub mail_api_key: String,

    /// Sender address for outgoing mail
    pub mail_from: String,

    /// Whether login requires a verified email
    pub require_email_verification: bool,

    /// Lifetime of an email verification token in hours
    pub verification_token_ttl_hours: i64,

    /// Minimum seconds between two replies from the same user
    pub reply_cooldown_secs: u64,

    /// Login attempts allowed per email per minute
    pub login_attempts_per_minute: u32,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite:fragrance_hub.db".to_string(),
            server_address: "127.0.0.1".to_string(),
            server_port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expires_in_secs: 7 * 24 * 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            public_base_url: "http://localhost:3000".to_string(),
            mail_api_url: String::new(),
            mail_api_key: String::new(),
            mail_from: "no-reply@fragrance-hub.local".to_string(),
            require_email_verification: true,
            verification_token_ttl_hours: 24,
            reply_cooldown_secs: 30,
            login_attempts_per_minute: 10,
            db_max_connections: 5,
            db_connection_timeout: 30,
        }
    }
}

/// Read an environment variable and parse it, falling back on absence or parse failure
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Config::default();

        Config {
            database_url: env_or("DATABASE_URL", defaults.database_url),
            server_address: env_or("SERVER_ADDRESS", defaults.server_address),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            environment: env_or("ENVIRONMENT", defaults.environment),
            log_level: env_or("LOG_LEVEL", defaults.log_level),
            jwt_secret: env_or("JWT_SECRET", defaults.jwt_secret),
            jwt_expires_in_secs: env_or("JWT_EXPIRES_IN_SECS", defaults.jwt_expires_in_secs),
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
            public_base_url: env_or("PUBLIC_BASE_URL", defaults.public_base_url),
            mail_api_url: env_or("MAIL_API_URL", defaults.mail_api_url),
            mail_api_key: env_or("MAIL_API_KEY", defaults.mail_api_key),
            mail_from: env_or("MAIL_FROM", defaults.mail_from),
            require_email_verification: env_or(
                "REQUIRE_EMAIL_VERIFICATION",
                defaults.require_email_verification,
            ),
            verification_token_ttl_hours: env_or(
                "VERIFICATION_TOKEN_TTL_HOURS",
                defaults.verification_token_ttl_hours,
            ),
            reply_cooldown_secs: env_or("REPLY_COOLDOWN_SECS", defaults.reply_cooldown_secs),
            login_attempts_per_minute: env_or(
                "LOGIN_ATTEMPTS_PER_MINUTE",
                defaults.login_attempts_per_minute,
            ),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_connection_timeout: env_or("DB_CONNECTION_TIMEOUT", defaults.db_connection_timeout),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if self.jwt_secret == DEV_JWT_SECRET {
            if self.is_production() {
                return Err("JWT_SECRET must be set in production".to_string());
            }
            log::warn!("JWT_SECRET not configured - using development secret");
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be in 4..=31, got {}", self.bcrypt_cost));
        }

        if self.login_attempts_per_minute == 0 {
            return Err("LOGIN_ATTEMPTS_PER_MINUTE must be positive".to_string());
        }

        if self.mail_api_url.is_empty() {
            log::warn!("MAIL_API_URL not configured - verification links will only be logged");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_production_rejects_dev_secret() {
        let config = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let config = Config {
            bcrypt_cost: 3,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
