// src/auth/mod.rs
// DOCUMENTATION: Authentication module organization
// PURPOSE: Password hashing, session tokens and request extractors

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::{AuthUser, MaybeAuthUser};
pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};
