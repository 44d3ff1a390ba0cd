/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Handler errors occur when processing HTTP requests:
 * - Missing or invalid credentials
 * - Access to another user's resources
 * - Missing records
 * - Conflicting writes (duplicate username, second live stream)
 *
 * ## Infrastructure Errors
 *
 * - Database and migration failures
 * - Token encoding failures
 * - Password hashing failures
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// This enum represents all possible errors that can occur in the backend.
/// Each variant includes relevant context and can be converted to an HTTP response.
///
/// # Usage
///
/// ```rust
/// use talent_haven::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// let err = BackendError::not_found("Post not found");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The write conflicts with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Shared error (validation, serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// JWT encoding error
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for a field validation failure (400)
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `NotFound` - 404, `Unauthorized` - 401, `Forbidden` - 403, `Conflict` - 409
    /// - `SharedError` - 400
    /// - `Database` - 409 for unique-constraint violations, 404 for missing rows, 500 otherwise
    /// - Everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                StatusCode::CONFLICT
            }
            Self::Database(_)
            | Self::Migration(_)
            | Self::Token(_)
            | Self::PasswordHash(_)
            | Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    ///
    /// Infrastructure errors are reduced to a generic message so that SQL
    /// and crypto details never reach the client.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Conflict(message) => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            Self::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                "Already exists".to_string()
            }
            Self::Database(_)
            | Self::Migration(_)
            | Self::Token(_)
            | Self::PasswordHash(_)
            | Self::SerializationError(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error() {
        let error = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
        match error {
            BackendError::HandlerError { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid request");
            }
            _ => panic!("Expected HandlerError"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(BackendError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BackendError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(BackendError::validation("f", "m").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BackendError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let error = BackendError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(error.message(), "Internal server error");
    }

    #[test]
    fn test_from_shared_error() {
        let backend_error: BackendError = SharedError::validation("field", "message").into();
        match backend_error {
            BackendError::SharedError(_) => {}
            _ => panic!("Expected SharedError variant"),
        }
    }
}
