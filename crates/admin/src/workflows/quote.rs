//! The quote workflow: email the customer, then record the send.
//!
//! Ordering matters. The email goes out first and the history entry is
//! written only on success, so a failed send leaves the order exactly as
//! it was. The optional `request_id` makes retries safe: once a history
//! note carries the marker, the workflow answers success without
//! resending.

use rust_decimal::Decimal;

use fagot_core::order::Order;
use fagot_core::types::{InvalidTransition, OrderId, OrderStatus};

use crate::db::OrderAdminRepository;
use crate::error::AppError;
use crate::services::QuoteEmail;
use crate::state::AppState;

/// Input for one quote send.
pub struct QuoteCommand {
    pub order_id: OrderId,
    pub amount: Decimal,
    /// Bank details override; settings provide the defaults.
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub note: Option<String>,
    /// Idempotency key chosen by the caller.
    pub request_id: Option<String>,
}

/// What the workflow did.
pub enum QuoteOutcome {
    /// Email sent and recorded.
    Sent(Order),
    /// A previous run already recorded this `request_id`; nothing resent.
    AlreadySent(Order),
}

/// Send a quote email for an order and move it to `confirmed`.
///
/// # Errors
///
/// `NotFound` for an unknown order, `InvalidTransition` when the order is
/// past the point where quotes make sense, `Email` when delivery fails
/// (order left unmodified), `Database` for repository failures.
pub async fn send_quote(state: &AppState, command: QuoteCommand) -> Result<QuoteOutcome, AppError> {
    let repo = OrderAdminRepository::new(state.pool());

    let detail = repo
        .get_detail(command.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", command.order_id)))?;
    let order = detail.order;

    if let Some(request_id) = &command.request_id
        && repo.has_quote_marker(command.order_id, request_id).await?
    {
        tracing::info!(
            order_number = %order.order_number,
            request_id = %request_id,
            "quote already recorded, skipping resend"
        );
        return Ok(QuoteOutcome::AlreadySent(order));
    }

    // Fail before the email leaves when the state machine would reject the
    // recording step anyway.
    if !matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) {
        return Err(AppError::InvalidTransition(InvalidTransition {
            from: order.status.as_str().to_owned(),
            to: OrderStatus::Confirmed.as_str().to_owned(),
        }));
    }

    let settings = state.settings().get().await?;
    let customer_name = format!(
        "{} {}",
        order.customer.first_name, order.customer.last_name
    );

    let email = QuoteEmail {
        customer_name: &customer_name,
        order_number: &order.order_number,
        amount: command.amount,
        account_holder: &settings.bank.account_holder,
        iban: command.iban.as_deref().unwrap_or(&settings.bank.iban),
        bic: command.bic.as_deref().unwrap_or(&settings.bank.bic),
        company_name: &settings.company.name,
        note: command.note.as_deref(),
    };

    state
        .email()
        .send_quote(order.customer.email.as_str(), &email)
        .await?;

    let updated = repo
        .record_quote_sent(command.order_id, command.amount, command.request_id.as_deref())
        .await?;

    tracing::info!(
        order_number = %updated.order_number,
        amount = %command.amount,
        "quote sent"
    );

    Ok(QuoteOutcome::Sent(updated))
}
