/// Unified error types for the complaint service
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failures at startup
    #[error("Migration {version} failed: {message}")]
    Migration { version: &'static str, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User-correctable input errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Student already has the maximum number of active complaints
    #[error(
        "You already have {limit} active complaints. Please wait for resolution before filing new ones."
    )]
    QuotaExceeded { limit: i64 },

    /// Conflict errors (e.g., duplicate admin username)
    #[error("{0}")]
    Conflict(String),

    /// Session token could not be produced
    #[error("Session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failures
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text to show the caller as a one-shot notice, for errors the caller can fix.
    pub fn notice(&self) -> Option<String> {
        match self {
            AppError::Validation(_) | AppError::QuotaExceeded { .. } | AppError::Conflict(_) => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

/// Convert AppError to an HTML error page
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(_) | AppError::QuotaExceeded { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            _ => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(), // Don't leak details
                )
            }
        };

        (status, Html(crate::views::error_page(status, &message))).into_response()
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors_have_notices() {
        let quota = AppError::QuotaExceeded { limit: 5 };
        assert_eq!(
            quota.notice().as_deref(),
            Some("You already have 5 active complaints. Please wait for resolution before filing new ones.")
        );

        let invalid = AppError::Validation(ValidationError::InvalidComplaintId);
        assert_eq!(invalid.notice().as_deref(), Some("Invalid complaint ID."));

        assert!(AppError::Internal("boom".to_string()).notice().is_none());
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let response = AppError::Internal("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
