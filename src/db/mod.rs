// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod avatar_repository;
pub mod favorite_repository;
pub mod reaction_repository;
pub mod reply_repository;
pub mod review_repository;
pub mod schema;
pub mod user_repository;

pub use avatar_repository::*;
pub use favorite_repository::*;
pub use reaction_repository::*;
pub use reply_repository::*;
pub use review_repository::*;
pub use schema::run_migrations;
pub use user_repository::*;
