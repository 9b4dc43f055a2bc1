// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod account_service;
pub mod avatar;
pub mod catalog;
pub mod cooldown;
pub mod login_throttle;
pub mod mailer;
pub mod moderation;
pub mod reply_service;
pub mod review_service;

pub use account_service::*;
pub use avatar::*;
pub use catalog::*;
pub use cooldown::*;
pub use login_throttle::*;
pub use mailer::*;
pub use reply_service::*;
pub use review_service::*;
