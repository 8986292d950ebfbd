//! Order entities: the persisted snapshot taken at checkout.
//!
//! An order exclusively owns its items, status history, and receipts.
//! Items capture a name/unit/price snapshot so later catalog edits never
//! alter historical orders, and the history is append-only: there is no
//! update or delete path anywhere in the codebase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, InvalidTransition, OrderId, OrderStatus, PaymentStatus, ProductId, Unit};

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Shipping address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Immutable once assigned; see [`crate::order_number`] for the format.
    pub order_number: String,
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    /// `subtotal + shipping_cost + tax`.
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub customer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    pub unit: Unit,
    /// Unit price at order time.
    pub unit_price: Decimal,
    pub quantity: u32,
    /// `unit_price × quantity`.
    pub total_price: Decimal,
}

/// One entry of the append-only status ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer-uploaded proof of payment attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub filename: String,
    pub url: String,
    /// Key of the object in external storage.
    pub external_id: String,
    pub uploaded_at: DateTime<Utc>,
}

/// An order with everything it owns, as returned by lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub receipts: Vec<Receipt>,
}

/// The marker embedded in history notes to make quote emails idempotent.
#[must_use]
pub fn quote_marker(request_id: &str) -> String {
    format!("[quote:{request_id}]")
}

/// The status an order lands in when a quote goes out.
///
/// A pending order moves to confirmed; a confirmed order stays put (the
/// quote is a resend). Anything further along or cancelled is rejected.
///
/// # Errors
///
/// Returns [`InvalidTransition`] when quotes cannot be sent from `current`.
pub fn quote_transition(current: OrderStatus) -> Result<OrderStatus, InvalidTransition> {
    match current {
        OrderStatus::Pending => current.transition_to(OrderStatus::Confirmed),
        OrderStatus::Confirmed => Ok(OrderStatus::Confirmed),
        _ => Err(InvalidTransition {
            from: current.as_str().to_owned(),
            to: OrderStatus::Confirmed.as_str().to_owned(),
        }),
    }
}

/// The history note recorded alongside a quote email.
#[must_use]
pub fn quote_note(amount: Decimal, request_id: Option<&str>) -> String {
    let mut note = format!("quote sent for {amount} EUR");
    if let Some(request_id) = request_id {
        note.push(' ');
        note.push_str(&quote_marker(request_id));
    }
    note
}

/// One entry of a [`StatusLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// In-memory model of the status ledger the repositories keep in SQL: the
/// order's current status plus its append-only entry list.
///
/// Every accepted change appends exactly one entry whose status matches the
/// new current status; a rejected transition leaves both untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLedger {
    status: OrderStatus,
    entries: Vec<LedgerEntry>,
}

impl StatusLedger {
    /// Open the ledger for a newly placed order.
    #[must_use]
    pub fn open(note: impl Into<String>) -> Self {
        let status = OrderStatus::Pending;
        Self {
            status,
            entries: vec![LedgerEntry {
                status,
                note: Some(note.into()),
            }],
        }
    }

    /// The order's current status, always equal to the last entry's.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// The appended entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Move to `next` and append the matching entry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the transition table forbids the
    /// edge; the ledger is left unchanged.
    pub fn transition(
        &mut self,
        next: OrderStatus,
        note: Option<String>,
    ) -> Result<(), InvalidTransition> {
        self.status = self.status.transition_to(next)?;
        self.entries.push(LedgerEntry {
            status: self.status,
            note,
        });
        Ok(())
    }

    /// Record that a quote went out, via [`quote_transition`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when quotes cannot be sent from the
    /// current status; the ledger is left unchanged.
    pub fn record_quote(
        &mut self,
        amount: Decimal,
        request_id: Option<&str>,
    ) -> Result<(), InvalidTransition> {
        self.status = quote_transition(self.status)?;
        self.entries.push(LedgerEntry {
            status: self.status,
            note: Some(quote_note(amount, request_id)),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_detail_flattens_order() {
        let order = Order {
            id: OrderId::new(1),
            order_number: "CMD25081442000".to_owned(),
            customer: Customer {
                first_name: "Marie".to_owned(),
                last_name: "Dupont".to_owned(),
                email: Email::parse("marie@example.fr").expect("valid"),
                phone: None,
            },
            shipping_address: ShippingAddress {
                line1: "4 rue des Érables".to_owned(),
                line2: None,
                postal_code: "73000".to_owned(),
                city: "Chambéry".to_owned(),
            },
            subtotal: Decimal::from(190),
            shipping_cost: Decimal::from(50),
            tax: Decimal::from(38),
            total: Decimal::from(278),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            customer_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let detail = OrderDetail {
            order,
            items: Vec::new(),
            status_history: Vec::new(),
            receipts: Vec::new(),
        };
        let json = serde_json::to_value(&detail).expect("serialize");
        // Flattened: order fields sit at the top level next to the arrays
        assert_eq!(json["order_number"], "CMD25081442000");
        assert!(json["items"].is_array());
        assert!(json.get("order").is_none());
    }

    #[test]
    fn test_ledger_appends_one_entry_per_transition() {
        let mut ledger = StatusLedger::open("order placed");
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.status(), OrderStatus::Pending);

        let path = [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for (appended, next) in path.into_iter().enumerate() {
            ledger.transition(next, None).expect("legal step");
            assert_eq!(ledger.entries().len(), appended + 2);
            assert_eq!(ledger.status(), next);
        }

        let last = ledger.entries().last().expect("entries");
        assert_eq!(last.status, ledger.status());
    }

    #[test]
    fn test_ledger_rejects_illegal_step_without_appending() {
        let mut ledger = StatusLedger::open("order placed");
        let err = ledger
            .transition(OrderStatus::Shipped, None)
            .expect_err("pending cannot ship");
        assert_eq!(err.from, "pending");
        assert_eq!(err.to, "shipped");
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_quote_confirms_pending_order() {
        let mut ledger = StatusLedger::open("order placed");
        ledger
            .record_quote(Decimal::new(27800, 2), Some("abc-123"))
            .expect("quote from pending");

        assert_eq!(ledger.status(), OrderStatus::Confirmed);
        assert_eq!(ledger.entries().len(), 2);
        let note = ledger
            .entries()
            .last()
            .and_then(|e| e.note.as_deref())
            .expect("note");
        assert!(note.contains("278.00 EUR"));
        assert!(note.contains("[quote:abc-123]"));
    }

    #[test]
    fn test_quote_resend_keeps_confirmed_status() {
        let mut ledger = StatusLedger::open("order placed");
        ledger
            .record_quote(Decimal::from(95), Some("first"))
            .expect("quote from pending");
        ledger
            .record_quote(Decimal::from(95), None)
            .expect("resend from confirmed");

        assert_eq!(ledger.status(), OrderStatus::Confirmed);
        assert_eq!(ledger.entries().len(), 3);
        let last = ledger.entries().last().expect("entries");
        assert_eq!(last.status, OrderStatus::Confirmed);
        assert_eq!(last.note.as_deref(), Some("quote sent for 95 EUR"));
    }

    #[test]
    fn test_quote_rejected_after_cancellation() {
        let mut ledger = StatusLedger::open("order placed");
        ledger
            .transition(OrderStatus::Cancelled, Some("customer gave up".to_owned()))
            .expect("cancel from pending");
        assert!(ledger.record_quote(Decimal::from(95), None).is_err());
        assert_eq!(ledger.entries().len(), 2);
    }

    #[test]
    fn test_quote_marker_format() {
        assert_eq!(quote_marker("abc-123"), "[quote:abc-123]");
    }
}
