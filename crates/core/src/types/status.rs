//! Order and payment status enums with their transition tables.
//!
//! Statuses are stored as snake_case TEXT columns, so both enums implement
//! `Display`/`FromStr` in addition to serde. Transitions go through the
//! fallible [`OrderStatus::transition_to`] / [`PaymentStatus::transition_to`]
//! rather than unconditional overwrite: an admin cannot ship a cancelled
//! order or resurrect a delivered one.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The happy path is `pending → confirmed → processing → shipped →
/// delivered`. `cancelled` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Attempted transition is not in the allowed-transitions table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// Status the order currently has.
    pub from: String,
    /// Status that was requested.
    pub to: String,
}

impl OrderStatus {
    /// All statuses, in lifecycle order. Used by admin listings.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether no further transition is allowed from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The allowed-transitions table.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (
                    Self::Pending | Self::Confirmed | Self::Processing | Self::Shipped,
                    Self::Cancelled
                )
        )
    }

    /// Check a transition, returning the new status when allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the edge is not in the table.
    pub fn transition_to(self, next: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// The snake_case name stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status, tracked independently of the order lifecycle.
///
/// Bank transfers settle out of band: the customer uploads a receipt and an
/// admin reconciles the account, so payment state moves on its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Received,
    Failed,
}

impl PaymentStatus {
    /// The allowed-transitions table: `pending → received | failed`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Received | Self::Failed)
        )
    }

    /// Check a transition, returning the new status when allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the edge is not in the table.
    pub fn transition_to(self, next: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// The snake_case name stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Received => "received",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "received" => Ok(Self::Received),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Sale unit for a firewood product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// One stère (~1 m³ stacked).
    #[default]
    Stere,
    /// Half a stère.
    HalfStere,
    /// Bag of kindling or compressed logs.
    Bag,
    /// Full pallet.
    Pallet,
}

impl Unit {
    /// The snake_case name stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stere => "stere",
            Self::HalfStere => "half_stere",
            Self::Bag => "bag",
            Self::Pallet => "pallet",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stere" => Ok(Self::Stere),
            "half_stere" => Ok(Self::HalfStere),
            "bag" => Ok(Self::Bag),
            "pallet" => Ok(Self::Pallet),
            _ => Err(format!("invalid unit: {s}")),
        }
    }
}

/// Display badge attached to a product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    New,
    Promo,
    Bestseller,
    /// Seasoned wood, below 20% humidity.
    Dry,
}

impl Badge {
    /// The snake_case name stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Promo => "promo",
            Self::Bestseller => "bestseller",
            Self::Dry => "dry",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Badge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "promo" => Ok(Self::Promo),
            "bestseller" => Ok(Self::Bestseller),
            "dry" => Ok(Self::Dry),
            _ => Err(format!("invalid badge: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut status = OrderStatus::Pending;
        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            status = status.transition_to(next).expect("legal edge");
        }
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_cancel_from_every_non_terminal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
        }
    }

    #[test]
    fn test_terminal_states_closed() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn test_no_skipping_ahead() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
        // No going back either
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_transition_error_names_both_ends() {
        let err = OrderStatus::Delivered
            .transition_to(OrderStatus::Pending)
            .expect_err("illegal edge");
        assert_eq!(err.from, "delivered");
        assert_eq!(err.to, "pending");
    }

    #[test]
    fn test_payment_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Received));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Received.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Received));
    }

    #[test]
    fn test_status_text_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
        assert!("shipped_maybe".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).expect("serialize");
        assert_eq!(json, "\"confirmed\"");
        let json = serde_json::to_string(&Unit::HalfStere).expect("serialize");
        assert_eq!(json, "\"half_stere\"");
    }
}
