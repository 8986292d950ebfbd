//! Money formatting helpers.
//!
//! All amounts in Fagot are EUR and carried as [`rust_decimal::Decimal`]
//! end to end (request DTOs, computation, storage). This module only holds
//! the display helpers shared by email templates and API payloads.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount for display, e.g. `185.50 €`.
///
/// Always renders two decimal places, rounding midpoints away from zero as
/// invoices do.
#[must_use]
pub fn format_eur(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2} €")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eur_two_decimals() {
        assert_eq!(format_eur(Decimal::new(1855, 1)), "185.50 €");
        assert_eq!(format_eur(Decimal::ZERO), "0.00 €");
    }

    #[test]
    fn test_format_eur_rounds_midpoint_up() {
        assert_eq!(format_eur(Decimal::new(12_005, 3)), "12.01 €");
        assert_eq!(format_eur(Decimal::new(12_004, 3)), "12.00 €");
    }
}
