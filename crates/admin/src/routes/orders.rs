//! Back-office order handlers: listing, detail, transitions, quotes.

use axum::Json;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use fagot_core::api::ApiResponse;
use fagot_core::order::{Order, OrderDetail};
use fagot_core::types::{OrderId, OrderStatus};

use crate::db::OrderAdminRepository;
use crate::error::{AppError, Result};
use crate::routes::check_payload;
use crate::state::AppState;
use crate::workflows::{QuoteCommand, QuoteOutcome, send_quote as run_quote_workflow};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List orders newest first, optionally filtered by status, paginated.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<OrderListResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| AppError::field("status", e))?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) * per_page;

    let result = OrderAdminRepository::new(state.pool())
        .list(status, per_page, offset)
        .await?;

    Ok(Json(ApiResponse::ok(OrderListResponse {
        orders: result.orders,
        total: result.total,
        page,
        per_page,
    })))
}

/// Load one order with items, history, and receipts.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<OrderDetail>>> {
    let detail = OrderAdminRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(ApiResponse::ok(detail)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusRequest {
    pub status: String,
    #[validate(length(max = 1000, message = "note is too long"))]
    pub note: Option<String>,
}

/// Move an order along the state machine. Illegal edges answer 409.
#[instrument(skip(state, request), fields(status = %request.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ApiResponse<Order>>> {
    check_payload(&request)?;
    let next: OrderStatus = request
        .status
        .parse()
        .map_err(|e| AppError::field("status", e))?;

    let order = OrderAdminRepository::new(state.pool())
        .update_status(id, next, request.note.as_deref())
        .await?;

    tracing::info!(order_number = %order.order_number, status = %order.status, "status updated");

    Ok(Json(ApiResponse::ok(order)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    pub amount: Decimal,
    #[validate(length(max = 50, message = "iban is too long"))]
    pub iban: Option<String>,
    #[validate(length(max = 20, message = "bic is too long"))]
    pub bic: Option<String>,
    #[validate(length(max = 1000, message = "note is too long"))]
    pub note: Option<String>,
    #[validate(length(max = 100, message = "request id is too long"))]
    pub request_id: Option<String>,
}

/// Send the quote email for an order and record it.
#[instrument(skip(state, request), fields(amount = %request.amount))]
pub async fn send_quote(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<Order>>> {
    check_payload(&request)?;
    if request.amount <= Decimal::ZERO {
        return Err(AppError::field("amount", "amount must be positive"));
    }

    let outcome = run_quote_workflow(
        &state,
        QuoteCommand {
            order_id: id,
            amount: request.amount,
            iban: request.iban,
            bic: request.bic,
            note: request.note,
            request_id: request.request_id,
        },
    )
    .await?;

    let (order, message) = match outcome {
        QuoteOutcome::Sent(order) => (order, "quote sent"),
        QuoteOutcome::AlreadySent(order) => (order, "quote already sent"),
    };

    let mut response = ApiResponse::ok(order);
    response.message = Some(message.to_owned());
    Ok(Json(response))
}
