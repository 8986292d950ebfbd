//! The cart aggregator: pure computation over a list of cart lines.
//!
//! The cart itself lives client-side; the server receives its lines and
//! recomputes everything here. All methods are side-effect free so the same
//! code backs both the `/cart/quote` endpoint and the checkout pipeline.
//! Checkout additionally re-validates stock against the live product rows -
//! the `stock` carried on a line is only the snapshot captured at add-time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settings::ShippingSettings;
use crate::types::ProductId;

/// One line of a customer cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Product name at add-time, used in validation messages.
    pub name: String,
    /// Unit price at add-time.
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Stock level at add-time. A ceiling for the quantity, not a guarantee.
    pub stock: i32,
}

impl CartLine {
    /// `unit_price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Computed totals for a cart, in the order they stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// A problem found while validating a cart.
///
/// Rendered as human-readable strings in API responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartIssue {
    #[error("the cart is empty")]
    Empty,
    #[error("order total {subtotal} is below the minimum order amount of {minimum}")]
    BelowMinimum { subtotal: Decimal, minimum: Decimal },
    #[error("insufficient stock for {name}: {requested} requested, {available} available")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: i32,
    },
}

/// A customer cart, aggregated server-side from its lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ(unit_price × quantity) over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Flat shipping cost, waived once the subtotal reaches the threshold.
    #[must_use]
    pub fn shipping_cost(&self, shipping: &ShippingSettings) -> Decimal {
        if self.subtotal() >= shipping.free_threshold {
            Decimal::ZERO
        } else {
            shipping.flat_cost
        }
    }

    /// Tax on the subtotal (shipping is carried tax-inclusive).
    #[must_use]
    pub fn tax(&self, rate: Decimal) -> Decimal {
        self.subtotal() * rate
    }

    /// Compute all totals in one pass: `total = subtotal + shipping + tax`.
    #[must_use]
    pub fn totals(&self, shipping: &ShippingSettings, tax_rate: Decimal) -> CartTotals {
        let subtotal = self.subtotal();
        let shipping_cost = self.shipping_cost(shipping);
        let tax = self.tax(tax_rate);
        CartTotals {
            subtotal,
            shipping_cost,
            tax,
            total: subtotal + shipping_cost + tax,
        }
    }

    /// Validate the cart against the minimum order amount and the stock
    /// snapshots captured at add-time.
    ///
    /// Returns every problem found, not just the first, so the storefront
    /// can show them all at once. An empty vec means the cart is orderable.
    #[must_use]
    pub fn validate(&self, minimum_order_amount: Decimal) -> Vec<CartIssue> {
        if self.is_empty() {
            return vec![CartIssue::Empty];
        }

        let mut issues = Vec::new();

        let subtotal = self.subtotal();
        if subtotal < minimum_order_amount {
            issues.push(CartIssue::BelowMinimum {
                subtotal,
                minimum: minimum_order_amount,
            });
        }

        for line in &self.lines {
            if i64::from(line.quantity) > i64::from(line.stock) {
                issues.push(CartIssue::InsufficientStock {
                    name: line.name.clone(),
                    requested: line.quantity,
                    available: line.stock.max(0),
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: u32, stock: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(1),
            name: "Chêne sec 33cm".to_owned(),
            unit_price: Decimal::from(price),
            quantity,
            stock,
        }
    }

    fn shipping(threshold: i64, flat: i64) -> ShippingSettings {
        ShippingSettings {
            free_threshold: Decimal::from(threshold),
            flat_cost: Decimal::from(flat),
        }
    }

    #[test]
    fn test_worked_example() {
        // price 95 x 2, threshold 500, flat 50, tax 20%
        let cart = Cart::new(vec![line(95, 2, 10)]);
        let totals = cart.totals(&shipping(500, 50), Decimal::new(20, 2));

        assert_eq!(totals.subtotal, Decimal::from(190));
        assert_eq!(totals.shipping_cost, Decimal::from(50));
        assert_eq!(totals.tax, Decimal::from(38));
        assert_eq!(totals.total, Decimal::from(278));
    }

    #[test]
    fn test_shipping_threshold_boundary() {
        let policy = shipping(500, 50);

        // 450 stays below the threshold
        let cart = Cart::new(vec![line(450, 1, 5)]);
        assert_eq!(cart.shipping_cost(&policy), Decimal::from(50));

        // 520 crosses it
        let cart = Cart::new(vec![line(520, 1, 5)]);
        assert_eq!(cart.shipping_cost(&policy), Decimal::ZERO);

        // Exactly at the threshold ships free
        let cart = Cart::new(vec![line(500, 1, 5)]);
        assert_eq!(cart.shipping_cost(&policy), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let mut second = line(12, 3, 100);
        second.product_id = ProductId::new(2);
        let cart = Cart::new(vec![line(95, 2, 10), second]);
        assert_eq!(cart.subtotal(), Decimal::from(95 * 2 + 12 * 3));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_totals_monotonic_in_quantity() {
        let policy = shipping(500, 50);
        let rate = Decimal::new(20, 2);
        let mut previous = Decimal::ZERO;
        for quantity in 1..=8 {
            let cart = Cart::new(vec![line(95, quantity, 100)]);
            let total = cart.totals(&policy, rate).total;
            assert!(total > previous, "qty {quantity}");
            previous = total;
        }
    }

    #[test]
    fn test_validate_empty_cart() {
        let cart = Cart::default();
        assert_eq!(cart.validate(Decimal::from(50)), vec![CartIssue::Empty]);
    }

    #[test]
    fn test_validate_below_minimum() {
        let cart = Cart::new(vec![line(20, 1, 5)]);
        let issues = cart.validate(Decimal::from(50));
        assert_eq!(
            issues,
            vec![CartIssue::BelowMinimum {
                subtotal: Decimal::from(20),
                minimum: Decimal::from(50),
            }]
        );
    }

    #[test]
    fn test_validate_flags_over_stock_lines() {
        let mut scarce = line(95, 4, 2);
        scarce.product_id = ProductId::new(2);
        scarce.name = "Hêtre 50cm".to_owned();
        let cart = Cart::new(vec![line(95, 2, 10), scarce]);

        let issues = cart.validate(Decimal::from(50));
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            CartIssue::InsufficientStock { name, requested: 4, available: 2 }
                if name == "Hêtre 50cm"
        ));
    }

    #[test]
    fn test_validate_ok_cart_has_no_issues() {
        let cart = Cart::new(vec![line(95, 2, 10)]);
        assert!(cart.validate(Decimal::from(50)).is_empty());
    }

    #[test]
    fn test_issue_messages_are_human_readable() {
        let issue = CartIssue::InsufficientStock {
            name: "Chêne sec 33cm".to_owned(),
            requested: 4,
            available: 2,
        };
        assert_eq!(
            issue.to_string(),
            "insufficient stock for Chêne sec 33cm: 4 requested, 2 available"
        );
        assert_eq!(CartIssue::Empty.to_string(), "the cart is empty");
    }
}
