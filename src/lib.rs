// src/lib.rs
// DOCUMENTATION: Library root shared by the server, the promote-admin tool and tests

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

pub use app::AppState;
pub use errors::HubError;
