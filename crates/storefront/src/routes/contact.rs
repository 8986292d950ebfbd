//! Contact form handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::types::Email;

use crate::db::{IntakeRepository, intake::NewContactMessage};
use crate::error::{AppError, Result};
use crate::routes::check_payload;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    pub email: String,
    #[validate(length(max = 30, message = "phone number is too long"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "subject is too long"))]
    pub subject: Option<String>,
    #[validate(length(
        min = 10,
        max = 5000,
        message = "message must be between 10 and 5000 characters"
    ))]
    pub message: String,
}

/// Store a contact-form message for the back office.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    check_payload(&request)?;
    let email =
        Email::parse(&request.email).map_err(|e| AppError::field("email", e.to_string()))?;

    IntakeRepository::new(state.pool())
        .create_contact_message(&NewContactMessage {
            name: request.name,
            email,
            phone: request.phone,
            subject: request.subject,
            message: request.message,
        })
        .await?;

    Ok(Json(ApiResponse::ok_message(
        "Your message has been sent, we will get back to you shortly",
    )))
}
