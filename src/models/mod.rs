// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod favorite;
pub mod fragrance;
pub mod reply;
pub mod review;
pub mod user;

pub use favorite::*;
pub use fragrance::*;
pub use reply::*;
pub use review::*;
pub use user::*;
