//! Settings handlers: read and replace the settings document.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use tracing::instrument;

use fagot_core::api::ApiResponse;
use fagot_core::settings::SiteSettings;

use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Serve the full settings document, bank details included. This API is
/// back-office only.
#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SiteSettings>>> {
    let settings = state.settings().get().await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// Replace the settings document and refresh the cache so the change is
/// visible to the next read.
#[instrument(skip(state, settings))]
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<SiteSettings>,
) -> Result<Json<ApiResponse<SiteSettings>>> {
    check_settings(&settings)?;

    SettingsRepository::new(state.pool()).put(&settings).await?;
    state.settings().refresh().await;

    tracing::info!("site settings updated");

    Ok(Json(ApiResponse::ok(settings)))
}

/// Sanity checks on the incoming document.
fn check_settings(settings: &SiteSettings) -> Result<()> {
    if settings.tax_rate < Decimal::ZERO || settings.tax_rate >= Decimal::ONE {
        return Err(AppError::field("tax_rate", "tax rate must be within [0, 1)"));
    }
    if settings.shipping.flat_cost < Decimal::ZERO {
        return Err(AppError::field(
            "shipping.flat_cost",
            "shipping cost cannot be negative",
        ));
    }
    if settings.shipping.free_threshold < Decimal::ZERO {
        return Err(AppError::field(
            "shipping.free_threshold",
            "free shipping threshold cannot be negative",
        ));
    }
    if settings.minimum_order_amount < Decimal::ZERO {
        return Err(AppError::field(
            "minimum_order_amount",
            "minimum order amount cannot be negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_pass_checks() {
        assert!(check_settings(&SiteSettings::default()).is_ok());
    }

    #[test]
    fn test_tax_rate_of_one_rejected() {
        let mut settings = SiteSettings::default();
        settings.tax_rate = Decimal::ONE;
        assert!(check_settings(&settings).is_err());
    }

    #[test]
    fn test_negative_shipping_cost_rejected() {
        let mut settings = SiteSettings::default();
        settings.shipping.flat_cost = Decimal::from(-1);
        assert!(check_settings(&settings).is_err());
    }
}
