//! Public site settings endpoint.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use fagot_core::api::ApiResponse;
use fagot_core::settings::PublicSettings;

use crate::error::Result;
use crate::state::AppState;

/// Serve the public subset of site settings from the TTL cache. Bank
/// details never appear here.
#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PublicSettings>>> {
    let settings = state.settings().get().await?;
    Ok(Json(ApiResponse::ok(PublicSettings::from(&settings))))
}
