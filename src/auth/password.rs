// src/auth/password.rs

use bcrypt::{hash, verify};

use crate::errors::HubError;

/// Hash a password with bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, HubError> {
    hash(password, cost).map_err(|e| {
        log::error!("Password hashing failed: {}", e);
        HubError::InternalError
    })
}

/// Compare a plain password against a stored bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, HubError> {
    verify(password, password_hash).map_err(|e| {
        log::error!("Password verification failed: {}", e);
        HubError::InternalError
    })
}
