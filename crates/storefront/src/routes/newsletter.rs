//! Newsletter subscription handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use fagot_core::api::ApiResponse;
use fagot_core::types::Email;

use crate::db::IntakeRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Subscribe an email address to the newsletter.
///
/// Duplicates answer the same success message as first-time signups, so
/// the endpoint leaks nothing about who is already subscribed.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let email =
        Email::parse(&request.email).map_err(|e| AppError::field("email", e.to_string()))?;

    let inserted = IntakeRepository::new(state.pool())
        .subscribe_newsletter(&email)
        .await?;
    if !inserted {
        tracing::debug!("email already subscribed");
    }

    Ok(Json(ApiResponse::ok_message(
        "Thanks, you are subscribed to the newsletter",
    )))
}
