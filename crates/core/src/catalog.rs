//! Catalog entities: categories and products.
//!
//! These are the domain shapes both binaries exchange over JSON; the db
//! layers in each binary map Postgres rows into them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Badge, CategoryId, ProductId, Unit};

/// A product category, e.g. "Bois bûches" or "Allume-feu".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL slug, unique across categories.
    pub slug: String,
    pub description: Option<String>,
    /// Display sort position, ascending.
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    /// URL slug, unique across products.
    pub slug: String,
    pub description: Option<String>,
    /// Wood species, e.g. "chêne" or "hêtre".
    pub essence: Option<String>,
    pub price: Decimal,
    /// Struck-through reference price when on promotion.
    pub compare_at_price: Option<Decimal>,
    pub unit: Unit,
    pub stock: i32,
    pub badges: Vec<Badge>,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the requested quantity can currently be fulfilled.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        i64::from(self.stock) >= i64::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(1),
            name: "Chêne sec 33cm".to_owned(),
            slug: "chene-sec-33cm".to_owned(),
            description: None,
            essence: Some("chêne".to_owned()),
            price: Decimal::from(95),
            compare_at_price: None,
            unit: Unit::Stere,
            stock,
            badges: vec![Badge::Dry],
            is_active: true,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock_for() {
        assert!(product(5).has_stock_for(5));
        assert!(!product(5).has_stock_for(6));
        assert!(!product(0).has_stock_for(1));
        assert!(product(0).has_stock_for(0));
    }
}
