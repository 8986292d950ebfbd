//! Checkout handler: validate the cart against live data and place the order.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::order::{Customer, Order, ShippingAddress};
use fagot_core::types::Email;

use crate::db::{NewOrder, NewOrderItem, OrderRepository};
use crate::error::{AppError, Result};
use crate::routes::cart::{CartItemRequest, resolve_cart};
use crate::routes::check_payload;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    pub email: String,
    #[validate(length(max = 30, message = "phone number is too long"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "address is required"))]
    pub address_line1: String,
    #[validate(length(max = 200, message = "address line is too long"))]
    pub address_line2: Option<String>,
    #[validate(length(min = 1, max = 20, message = "postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    #[validate(length(max = 2000, message = "note is too long"))]
    pub customer_note: Option<String>,
    #[validate(length(min = 1, message = "the cart is empty"))]
    #[validate(nested)]
    pub items: Vec<CartItemRequest>,
}

/// Place an order.
///
/// The client cart is joined against live product rows, re-validated
/// (minimum order amount, stock), totalled from current settings, and
/// persisted in one transaction. Responds 201 with the created order; its
/// `order_number` is the customer's handle for later lookups.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>)> {
    check_payload(&request)?;
    let email =
        Email::parse(&request.email).map_err(|e| AppError::field("email", e.to_string()))?;

    let resolved = resolve_cart(&state, &request.items).await?;
    let settings = state.settings().get().await?;

    let issues = resolved.cart.validate(settings.minimum_order_amount);
    if !issues.is_empty() {
        return Err(AppError::Validation {
            message: "the cart cannot be ordered".to_owned(),
            errors: issues
                .iter()
                .map(|issue| fagot_core::api::FieldError::new("items", issue.to_string()))
                .collect(),
        });
    }

    let totals = resolved.cart.totals(&settings.shipping, settings.tax_rate);
    let mut items = Vec::with_capacity(resolved.cart.lines.len());
    for line in &resolved.cart.lines {
        // resolve_cart only emits lines for products it found
        let product = resolved.products.get(&line.product_id).ok_or_else(|| {
            AppError::Internal(format!("resolved cart lost product {}", line.product_id))
        })?;
        items.push(NewOrderItem {
            product_id: line.product_id,
            name: product.name.clone(),
            unit: product.unit,
            unit_price: product.price,
            quantity: line.quantity,
        });
    }

    let order = OrderRepository::new(state.pool())
        .create(NewOrder {
            customer: Customer {
                first_name: request.first_name,
                last_name: request.last_name,
                email,
                phone: request.phone,
            },
            shipping_address: ShippingAddress {
                line1: request.address_line1,
                line2: request.address_line2,
                postal_code: request.postal_code,
                city: request.city,
            },
            customer_note: request.customer_note,
            totals,
            items,
        })
        .await?;

    tracing::info!(order_number = %order.order_number, total = %order.total, "order placed");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}
