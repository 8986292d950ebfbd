//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check
//!
//! # Catalog
//! GET  /api/categories                      - Active categories
//! GET  /api/categories/{slug}/products      - Products of one category
//! GET  /api/products                        - Active products
//! GET  /api/products/{slug}                 - Product detail
//! GET  /api/settings                        - Public site settings
//!
//! # Cart and checkout
//! POST /api/cart/quote                      - Recompute cart totals server-side
//! POST /api/checkout                        - Place an order
//!
//! # Orders
//! GET  /api/orders/{order_number}           - Order lookup by number
//! POST /api/orders/{order_number}/receipt   - Upload payment receipt
//!
//! # Intake
//! POST /api/newsletter/subscribe            - Newsletter signup
//! POST /api/contact                         - Contact form
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod newsletter;
pub mod orders;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};
use validator::Validate;

use fagot_core::api::FieldError;

use crate::error::AppError;
use crate::state::AppState;

/// Create the catalog routes router (read-only, relaxed rate limit).
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::list_categories))
        .route(
            "/categories/{slug}/products",
            get(catalog::list_category_products),
        )
        .route("/products", get(catalog::list_products))
        .route("/products/{slug}", get(catalog::get_product))
        .route("/settings", get(settings::get_settings))
        .route("/cart/quote", post(cart::quote))
        .route("/orders/{order_number}", get(orders::get_order))
}

/// Create the intake routes router (writes, strict rate limit).
pub fn intake_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::checkout))
        .route("/orders/{order_number}/receipt", post(orders::upload_receipt))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/contact", post(contact::submit))
}

/// Run `validator` checks on a request payload, mapping failures to the
/// field-level envelope shape.
pub(crate) fn check_payload(payload: &impl Validate) -> Result<(), AppError> {
    payload.validate().map_err(|validation| {
        let mut errors = Vec::new();
        for (field, field_errors) in validation.field_errors() {
            for error in field_errors {
                let message = error.message.as_ref().map_or_else(
                    || format!("invalid value for {field}"),
                    ToString::to_string,
                );
                errors.push(FieldError::new(field.to_string(), message));
            }
        }
        AppError::Validation {
            message: "validation failed".to_owned(),
            errors,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    #[test]
    fn test_check_payload_maps_field_errors() {
        let err = check_payload(&Probe {
            name: String::new(),
        })
        .expect_err("empty name");

        match err {
            AppError::Validation { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
                assert_eq!(errors[0].message, "name must not be empty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_payload_accepts_valid() {
        assert!(
            check_payload(&Probe {
                name: "Chêne".to_owned(),
            })
            .is_ok()
        );
    }
}
