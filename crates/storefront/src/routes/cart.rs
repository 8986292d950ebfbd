//! Cart quote handler: server-side recomputation of a client cart.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::cart::{Cart, CartLine, CartTotals};
use fagot_core::catalog::Product;
use fagot_core::types::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::routes::check_payload;
use crate::state::AppState;

/// One cart line as sent by the client. Only ids and quantities are
/// trusted; names, prices, and stock come from the live catalog.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CartItemRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1, max = 999, message = "quantity must be between 1 and 999"))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    #[validate(length(min = 1, message = "the cart is empty"))]
    #[validate(nested)]
    pub items: Vec<CartItemRequest>,
}

/// One priced line of the quote response.
#[derive(Debug, Serialize)]
pub struct QuoteLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub lines: Vec<QuoteLine>,
    pub totals: CartTotals,
    /// Human-readable problems; empty means the cart is orderable.
    pub issues: Vec<String>,
    pub orderable: bool,
}

/// A client cart joined against the live catalog.
pub(crate) struct ResolvedCart {
    pub cart: Cart,
    pub products: HashMap<ProductId, Product>,
}

/// Join request items against live product rows, merging duplicate ids.
///
/// Unknown or inactive products fail validation rather than silently
/// dropping a line the customer expects to pay for.
pub(crate) async fn resolve_cart(
    state: &AppState,
    items: &[CartItemRequest],
) -> Result<ResolvedCart> {
    let mut quantities: HashMap<ProductId, u32> = HashMap::new();
    let mut ordering: Vec<ProductId> = Vec::new();
    for item in items {
        let entry = quantities.entry(item.product_id).or_insert(0);
        if *entry == 0 {
            ordering.push(item.product_id);
        }
        *entry = entry.saturating_add(item.quantity);
    }

    let products: HashMap<ProductId, Product> = ProductRepository::new(state.pool())
        .get_by_ids(&ordering)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines = Vec::with_capacity(ordering.len());
    for product_id in ordering {
        let Some(product) = products.get(&product_id) else {
            return Err(AppError::field(
                "items",
                format!("unknown or inactive product {product_id}"),
            ));
        };
        lines.push(CartLine {
            product_id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantities.get(&product_id).copied().unwrap_or(0),
            stock: product.stock,
        });
    }

    Ok(ResolvedCart {
        cart: Cart::new(lines),
        products,
    })
}

/// Recompute totals for a client cart against live prices and settings.
#[instrument(skip(state, request))]
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>> {
    check_payload(&request)?;

    let resolved = resolve_cart(&state, &request.items).await?;
    let settings = state.settings().get().await?;

    let totals = resolved.cart.totals(&settings.shipping, settings.tax_rate);
    let issues: Vec<String> = resolved
        .cart
        .validate(settings.minimum_order_amount)
        .iter()
        .map(ToString::to_string)
        .collect();

    let lines = resolved
        .cart
        .lines
        .iter()
        .map(|line| QuoteLine {
            product_id: line.product_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        })
        .collect();

    Ok(Json(ApiResponse::ok(QuoteResponse {
        lines,
        totals,
        orderable: issues.is_empty(),
        issues,
    })))
}
