// src/app.rs
// DOCUMENTATION: Shared application state and route registration
// PURPOSE: One place that wires app_data and routes, used by main.rs and the integration tests

use crate::auth::JwtManager;
use crate::config::Config;
use crate::errors::HubError;
use crate::handlers;
use crate::services::{Catalog, LoginThrottle, Mailer, ReplyCooldown};
use actix_web::web;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Everything the handlers pull out of app_data
/// DOCUMENTATION: Cheap to clone; HttpServer clones it into every worker
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub jwt: JwtManager,
    pub mailer: Mailer,
    pub catalog: Arc<Catalog>,
    pub cooldown: Arc<ReplyCooldown>,
    pub throttle: Arc<LoginThrottle>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config, catalog: Catalog) -> Self {
        AppState {
            jwt: JwtManager::from_config(&config),
            mailer: Mailer::from_config(&config),
            cooldown: Arc::new(ReplyCooldown::new(config.reply_cooldown_secs)),
            throttle: Arc::new(LoginThrottle::new(config.login_attempts_per_minute)),
            catalog: Arc::new(catalog),
            pool,
            config,
        }
    }

    /// Register state, extractor error handlers and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.jwt.clone()))
            .app_data(web::Data::new(self.mailer.clone()))
            .app_data(web::Data::from(self.catalog.clone()))
            .app_data(web::Data::new(self.cooldown.clone()))
            .app_data(web::Data::new(self.throttle.clone()))
            // Malformed bodies, queries and paths get the same JSON error shape
            .app_data(web::JsonConfig::default().limit(64 * 1024).error_handler(
                |err, _req| HubError::InvalidInput(format!("Invalid JSON body: {}", err)).into(),
            ))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                HubError::InvalidInput(format!("Invalid query string: {}", err)).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                HubError::InvalidInput(format!("Invalid path parameter: {}", err)).into()
            }))
            .configure(handlers::health_config)
            .configure(handlers::auth_config)
            .configure(handlers::profile_config)
            .configure(handlers::favorites_config)
            .configure(handlers::reviews_config)
            .configure(handlers::replies_config)
            .configure(handlers::admin_config)
            .configure(handlers::fragrances_config);
    }
}
