//! Site settings payload.
//!
//! A single active settings document drives the cart totals (shipping
//! threshold and cost, tax rate, minimum order) and the quote emails (bank
//! details, company info). It is seeded by the CLI, edited in the admin, and
//! served to handlers through the storefront's TTL cache.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bank-transfer details included in quote emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub iban: String,
    pub bic: String,
}

/// Shipping policy: flat cost, waived above the free threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    pub free_threshold: Decimal,
    pub flat_cost: Decimal,
}

/// Company identity used in emails and the public settings payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// The full settings document, as stored in `site_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub bank: BankDetails,
    pub shipping: ShippingSettings,
    /// Tax rate applied to the subtotal, e.g. 0.20.
    pub tax_rate: Decimal,
    pub minimum_order_amount: Decimal,
    pub company: CompanyInfo,
}

impl Default for SiteSettings {
    /// Seed values used by `fagot-cli seed` on a fresh database.
    fn default() -> Self {
        Self {
            bank: BankDetails {
                account_holder: "Fagot SARL".to_owned(),
                iban: "FR76 3000 4000 0100 0001 2345 678".to_owned(),
                bic: "BNPAFRPP".to_owned(),
            },
            shipping: ShippingSettings {
                free_threshold: Decimal::from(500),
                flat_cost: Decimal::from(50),
            },
            tax_rate: Decimal::new(20, 2),
            minimum_order_amount: Decimal::from(50),
            company: CompanyInfo {
                name: "Fagot".to_owned(),
                email: "contact@fagot-bois.fr".to_owned(),
                phone: "+33 4 00 00 00 00".to_owned(),
                address: "12 route des Combes, 73000 Chambéry".to_owned(),
            },
        }
    }
}

/// The subset of settings exposed on the public storefront.
///
/// Bank details stay out of it; they only travel inside quote emails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicSettings {
    pub shipping: ShippingSettings,
    pub tax_rate: Decimal,
    pub minimum_order_amount: Decimal,
    pub company: CompanyInfo,
}

impl From<&SiteSettings> for PublicSettings {
    fn from(settings: &SiteSettings) -> Self {
        Self {
            shipping: settings.shipping,
            tax_rate: settings.tax_rate,
            minimum_order_amount: settings.minimum_order_amount,
            company: settings.company.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_consistent() {
        let settings = SiteSettings::default();
        assert!(settings.shipping.free_threshold > settings.minimum_order_amount);
        assert!(settings.tax_rate > Decimal::ZERO && settings.tax_rate < Decimal::ONE);
    }

    #[test]
    fn test_public_settings_omit_bank_details() {
        let settings = SiteSettings::default();
        let public = PublicSettings::from(&settings);
        let json = serde_json::to_string(&public).expect("serialize");
        assert!(!json.contains("iban"));
        assert!(!json.contains(&settings.bank.iban));
        assert!(json.contains("free_threshold"));
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let settings = SiteSettings::default();
        let json = serde_json::to_value(&settings).expect("serialize");
        let back: SiteSettings = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, settings);
    }
}
