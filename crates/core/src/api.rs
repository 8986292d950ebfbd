//! The JSON response envelope shared by the storefront and admin APIs.
//!
//! Every response body has the shape
//! `{ success, message?, data?, type?, errors? }` where `type` is one of the
//! [`ErrorCode`] values and `errors` carries field-level validation detail.

use serde::{Deserialize, Serialize};

/// Coarse error taxonomy carried in the `type` field of error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    RateLimitExceeded,
    MethodNotAllowed,
    Error,
}

/// Field-level detail for validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The response envelope.
///
/// Optional fields are skipped when absent so success payloads stay small.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error_type: None,
            errors: None,
        }
    }

    /// Successful response with a message and no data.
    #[must_use]
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error_type: None,
            errors: None,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Error response with a code and message.
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error_type: Some(code),
            errors: None,
        }
    }

    /// Validation failure with field-level detail.
    #[must_use]
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error_type: Some(ErrorCode::ValidationError),
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_skips_absent_fields() {
        let response = ApiResponse::ok(serde_json::json!({"id": 1}));
        let json = serde_json::to_string(&response).expect("serialize");
        assert_eq!(json, r#"{"success":true,"data":{"id":1}}"#);
    }

    #[test]
    fn test_error_carries_type() {
        let response = ApiResponse::error(ErrorCode::RateLimitExceeded, "slow down");
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["type"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(json["message"], "slow down");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_validation_carries_field_errors() {
        let response = ApiResponse::validation(
            "validation failed",
            vec![FieldError::new("email", "email must contain an @ symbol")],
        );
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["type"], "VALIDATION_ERROR");
        assert_eq!(json["errors"][0]["field"], "email");
    }
}
