// src/auth/jwt.rs
// DOCUMENTATION: Session token issuing and verification
// PURPOSE: HS256 JWTs carrying the user id, username and admin flag

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::HubError;

const ISSUER: &str = "fragrance-hub";

/// Token payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, HubError> {
        self.sub
            .parse()
            .map_err(|_| HubError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct JwtManager {
    expires_in_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str, expires_in_secs: i64) -> Self {
        Self {
            expires_in_secs,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expires_in_secs)
    }

    /// Issue a token; returns it with its expiry as a unix timestamp
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        is_admin: bool,
    ) -> Result<(String, i64), HubError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            is_admin,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: ISSUER.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            log::error!("Failed to sign token: {}", e);
            HubError::InternalError
        })?;

        Ok((token, exp.timestamp()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, HubError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    HubError::Unauthorized("Session expired".to_string())
                }
                _ => HubError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        Ok(data.claims)
    }
}
