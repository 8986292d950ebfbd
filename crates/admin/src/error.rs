//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding with the JSON envelope. All route handlers should
//! return `Result<T, AppError>`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use fagot_core::api::{ApiResponse, ErrorCode, FieldError};
use fagot_core::types::InvalidTransition;
use fagot_core::upload::UploadError;

use crate::db::{RepositoryError, UpdateStatusError};
use crate::services::{EmailError, StorageError};

/// Application-level error type for the back office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request payload failed validation.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// An uploaded file was rejected.
    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),

    /// The status transition table forbids this change.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error with a single offending field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation {
            message: message.clone(),
            errors: vec![FieldError::new(field, message)],
        }
    }
}

// The settings cache shares one load across callers, so its error arrives
// behind an Arc.
impl From<std::sync::Arc<RepositoryError>> for AppError {
    fn from(e: std::sync::Arc<RepositoryError>) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<UpdateStatusError> for AppError {
    fn from(e: UpdateStatusError) -> Self {
        match e {
            UpdateStatusError::Invalid(invalid) => Self::InvalidTransition(invalid),
            UpdateStatusError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Storage(_) | Self::Email(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::InvalidTransition(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) | Self::Email(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::Upload(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(RepositoryError::NotFound) => {
                ApiResponse::error(ErrorCode::Error, "Not found")
            }
            Self::Database(RepositoryError::Conflict(message)) => {
                ApiResponse::error(ErrorCode::Error, message)
            }
            Self::Database(_) | Self::Internal(_) => {
                ApiResponse::error(ErrorCode::Error, "Internal server error")
            }
            Self::Storage(_) => ApiResponse::error(ErrorCode::Error, "Storage service error"),
            Self::Email(_) => ApiResponse::error(ErrorCode::Error, "Email delivery failed"),
            Self::NotFound(what) => {
                ApiResponse::error(ErrorCode::Error, format!("Not found: {what}"))
            }
            Self::Validation { message, errors } => ApiResponse::validation(message, errors),
            Self::Upload(e) => ApiResponse::error(ErrorCode::ValidationError, e.to_string()),
            Self::InvalidTransition(e) => ApiResponse::error(ErrorCode::Error, e.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        let err = AppError::InvalidTransition(InvalidTransition {
            from: "delivered".to_owned(),
            to: "pending".to_owned(),
        });
        assert_eq!(err.to_string(), "invalid status transition: delivered -> pending");
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "slug taken".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }
}
