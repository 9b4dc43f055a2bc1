// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, catalog and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use fragrance_hub::config::{self, Config};
use fragrance_hub::services::{start_cleanup_task, Catalog};
use fragrance_hub::{db, handlers, AppState};
use std::io;

/// Seconds between sweeps of the reply cooldown map and login limiter
const CLEANUP_INTERVAL_SECS: u64 = 600;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let level = if config.log_level.is_empty() {
            "info"
        } else {
            config.log_level.as_str()
        };
        std::env::set_var("RUST_LOG", format!("{},actix_web=info,sqlx=warn", level));
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting fragrance-hub...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool and schema
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        log::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // 5. Load the embedded fragrance catalog
    let catalog = match Catalog::embedded() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("Failed to load fragrance catalog: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(pool, config.clone(), catalog);

    // Background sweep of in-memory limiters (every 10 minutes)
    start_cleanup_task(
        state.cooldown.clone(),
        state.throttle.clone(),
        CLEANUP_INTERVAL_SECS,
    );
    log::info!(
        "Started cleanup task (interval: {} seconds)",
        CLEANUP_INTERVAL_SECS
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // State and routes
            .configure(|cfg| state.configure(cfg))
            .default_service(web::to(handlers::not_found))
    })
    .bind(&server_addr)?
    .run()
    .await
}
