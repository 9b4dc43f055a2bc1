// src/services/login_throttle.rs
// DOCUMENTATION: Login attempt limiting keyed by email

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

use crate::errors::HubError;

/// Per-email login attempt limiter
pub struct LoginThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl LoginThrottle {
    /// `attempts_per_minute` of zero is treated as one
    pub fn new(attempts_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    /// Consume one attempt for this email
    pub fn check(&self, email: &str) -> Result<(), HubError> {
        let key = email.trim().to_lowercase();
        self.limiter.check_key(&key).map_err(|_| {
            log::warn!("Login throttled for {}", key);
            HubError::RateLimitExceeded(
                "Too many login attempts, please try again in a minute".to_string(),
            )
        })
    }

    /// Forget keys whose quota has fully replenished
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}
