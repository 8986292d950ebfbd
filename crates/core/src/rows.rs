//! sqlx row mirrors of the order entities.
//!
//! Both binaries read the same `orders` tables, so the raw row structs and
//! their domain conversions live here behind the `postgres` feature. The
//! conversions are pure: parsing failures surface as [`RowError`], which the
//! repositories map onto their corruption variant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::order::{Customer, Order, OrderItem, Receipt, ShippingAddress, StatusHistoryEntry};
use crate::types::{Email, OrderId, OrderStatus, PaymentStatus, ProductId, Unit};

/// A stored value that does not parse into its domain type.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RowError(pub String);

/// Column list matching [`OrderRow`], for `SELECT`/`RETURNING` clauses.
pub const ORDER_COLUMNS: &str = r"
    id, order_number, first_name, last_name, email, phone,
    address_line1, address_line2, postal_code, city,
    subtotal, shipping_cost, tax, total, status, payment_status,
    customer_note, created_at, updated_at
";

/// Raw `orders` row before conversion to the domain type.
#[derive(sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
    pub payment_status: String,
    pub customer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RowError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RowError(format!("invalid email in database: {e}")))?;
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RowError(format!("invalid status in database: {e}")))?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(|e| RowError(format!("invalid payment status in database: {e}")))?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer: Customer {
                first_name: row.first_name,
                last_name: row.last_name,
                email,
                phone: row.phone,
            },
            shipping_address: ShippingAddress {
                line1: row.address_line1,
                line2: row.address_line2,
                postal_code: row.postal_code,
                city: row.city,
            },
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            tax: row.tax,
            total: row.total,
            status,
            payment_status,
            customer_note: row.customer_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw `order_items` row.
#[derive(sqlx::FromRow)]
pub struct OrderItemRow {
    pub product_id: i64,
    pub name: String,
    pub unit: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RowError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let unit: Unit = row
            .unit
            .parse()
            .map_err(|e| RowError(format!("invalid unit in database: {e}")))?;
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RowError(format!("negative quantity in database: {}", row.quantity))
        })?;
        Ok(Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            unit,
            unit_price: row.unit_price,
            quantity,
            total_price: row.total_price,
        })
    }
}

/// Raw `order_status_history` row.
#[derive(sqlx::FromRow)]
pub struct HistoryRow {
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for StatusHistoryEntry {
    type Error = RowError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RowError(format!("invalid status in database: {e}")))?;
        Ok(Self {
            status,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

/// Raw `order_receipts` row.
#[derive(sqlx::FromRow)]
pub struct ReceiptRow {
    pub filename: String,
    pub url: String,
    pub external_id: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Self {
            filename: row.filename,
            url: row.url,
            external_id: row.external_id,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_row() -> OrderRow {
        OrderRow {
            id: 1,
            order_number: "CMD25081442000".to_owned(),
            first_name: "Marie".to_owned(),
            last_name: "Dupont".to_owned(),
            email: "marie@example.fr".to_owned(),
            phone: None,
            address_line1: "4 rue des Érables".to_owned(),
            address_line2: None,
            postal_code: "73000".to_owned(),
            city: "Chambéry".to_owned(),
            subtotal: Decimal::from(190),
            shipping_cost: Decimal::from(50),
            tax: Decimal::from(38),
            total: Decimal::from(278),
            status: "pending".to_owned(),
            payment_status: "pending".to_owned(),
            customer_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_row_maps_to_domain() {
        let order = Order::try_from(order_row()).expect("valid row");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer.email.as_str(), "marie@example.fr");
    }

    #[test]
    fn test_order_row_rejects_unknown_status() {
        let mut row = order_row();
        row.status = "limbo".to_owned();
        let err = Order::try_from(row).expect_err("unknown status");
        assert!(err.to_string().contains("invalid status"));
    }

    #[test]
    fn test_item_row_rejects_negative_quantity() {
        let row = OrderItemRow {
            product_id: 1,
            name: "Chêne sec 33 cm".to_owned(),
            unit: "stere".to_owned(),
            unit_price: Decimal::from(95),
            quantity: -2,
            total_price: Decimal::from(190),
        };
        let err = OrderItem::try_from(row).expect_err("negative quantity");
        assert!(err.to_string().contains("negative quantity"));
    }
}
