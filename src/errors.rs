// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every handler returns Result<_, HubError>
/// Each variant maps to an HTTP status code and a JSON error body
#[derive(Error, Debug)]
pub enum HubError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content rejected: {0}")]
    SpamDetected(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    RateLimitExceeded(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Internal server error")]
    InternalError,
}

impl HubError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            HubError::NotFound(_) => "NOT_FOUND",
            HubError::AlreadyExists(_) => "ALREADY_EXISTS",
            HubError::DatabaseError(_) => "DATABASE_ERROR",
            HubError::InvalidInput(_) => "INVALID_INPUT",
            HubError::ValidationError(_) => "VALIDATION_ERROR",
            HubError::SpamDetected(_) => "SPAM_DETECTED",
            HubError::Unauthorized(_) => "UNAUTHORIZED",
            HubError::Forbidden(_) => "FORBIDDEN",
            HubError::RateLimitExceeded(_) => "RATE_LIMIT_EXCEEDED",
            HubError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            HubError::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for HubError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HubError::ValidationError(errors.to_string())
    }
}

/// Convert HubError to HTTP response
/// DOCUMENTATION: `error` carries the human-readable message, `code` the variant
impl ResponseError for HubError {
    fn error_response(&self) -> HttpResponse {
        // Database details stay in the log, not in the response
        let message = match self {
            HubError::DatabaseError(_) | HubError::InternalError => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.code(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::AlreadyExists(_) => StatusCode::CONFLICT,
            HubError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HubError::ValidationError(_) => StatusCode::BAD_REQUEST,
            HubError::SpamDetected(_) => StatusCode::BAD_REQUEST,
            HubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HubError::Forbidden(_) => StatusCode::FORBIDDEN,
            HubError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            HubError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            HubError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
