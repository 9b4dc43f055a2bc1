// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod admin;
pub mod auth;
pub mod favorites;
pub mod fragrances;
pub mod health;
pub mod profile;
pub mod replies;
pub mod reviews;

pub use admin::config as admin_config;
pub use auth::config as auth_config;
pub use favorites::config as favorites_config;
pub use fragrances::config as fragrances_config;
pub use health::config as health_config;
pub use profile::config as profile_config;
pub use replies::config as replies_config;
pub use reviews::config as reviews_config;

use crate::errors::HubError;
use actix_web::{HttpRequest, HttpResponse};

/// Fallback for unmatched routes
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, HubError> {
    Err(HubError::NotFound(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
