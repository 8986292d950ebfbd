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
use fagot_core::upload::UploadError;

use crate::db::{CreateOrderError, RepositoryError};
use crate::services::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

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

    /// Checkout could not reserve the requested stock.
    #[error("Insufficient stock for {0}")]
    OutOfStock(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

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

impl From<CreateOrderError> for AppError {
    fn from(e: CreateOrderError) -> Self {
        match e {
            CreateOrderError::OutOfStock { name } => Self::OutOfStock(name),
            CreateOrderError::NumberExhausted(e) => Self::Internal(e.to_string()),
            CreateOrderError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Storage(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::OutOfStock(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Internal(_) => {
                ApiResponse::error(ErrorCode::Error, "Internal server error")
            }
            Self::Storage(_) => ApiResponse::error(ErrorCode::Error, "Storage service error"),
            Self::NotFound(what) => {
                ApiResponse::error(ErrorCode::Error, format!("Not found: {what}"))
            }
            Self::Validation { message, errors } => ApiResponse::validation(message, errors),
            Self::Upload(e) => ApiResponse::error(ErrorCode::ValidationError, e.to_string()),
            Self::OutOfStock(name) => {
                ApiResponse::error(ErrorCode::Error, format!("Insufficient stock for {name}"))
            }
            Self::RateLimited => ApiResponse::error(
                ErrorCode::RateLimitExceeded,
                "Too many requests, please try again later",
            ),
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
    fn test_app_error_display() {
        let err = AppError::NotFound("product chene-sec".to_string());
        assert_eq!(err.to_string(), "Not found: product chene-sec");

        let err = AppError::OutOfStock("Chêne sec".to_string());
        assert_eq!(err.to_string(), "Insufficient stock for Chêne sec");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::field("email", "invalid email")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::OutOfStock("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_out_of_stock_from_create_order_error() {
        let err: AppError = CreateOrderError::OutOfStock {
            name: "Stère de hêtre".to_string(),
        }
        .into();
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }
}
