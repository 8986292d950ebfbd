//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//!
//! # Categories
//! GET  /api/categories               - All categories
//! POST /api/categories               - Create category
//! PUT  /api/categories/{id}          - Update category
//! DELETE /api/categories/{id}        - Delete category (blocked while referenced)
//!
//! # Products
//! GET  /api/products                 - All products
//! POST /api/products                 - Create product
//! PUT  /api/products/{id}            - Update product
//! DELETE /api/products/{id}          - Delete product (blocked while ordered)
//! POST /api/products/{id}/image      - Upload catalog image
//!
//! # Orders
//! GET  /api/orders                   - Paginated list, filter by status
//! GET  /api/orders/{id}              - Order detail
//! POST /api/orders/{id}/status       - Transition-checked status change
//! POST /api/orders/{id}/quote        - Send quote email, mark confirmed
//!
//! # Settings
//! GET  /api/settings                 - Full settings document
//! PUT  /api/settings                 - Replace settings (write-through)
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{
    Router,
    routing::{get, post, put},
};
use validator::Validate;

use fagot_core::api::FieldError;

use crate::error::AppError;
use crate::state::AppState;

/// Create the back-office API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/products/{id}/image", post(products::upload_image))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/quote", post(orders::send_quote))
        .route("/settings", get(settings::get_settings).put(settings::put_settings))
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
