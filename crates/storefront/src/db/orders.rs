//! Order repository: checkout, lookup, history, receipts.
//!
//! Order creation is a single transaction: stock decrements first (atomic
//! conditional updates, so two concurrent checkouts cannot oversell), then
//! the collision-checked order number, the order row, its item snapshots,
//! and the initial `pending` history entry. Any failure rolls the whole
//! thing back.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use fagot_core::cart::CartTotals;
use fagot_core::order::{
    Customer, Order, OrderDetail, OrderItem, Receipt, ShippingAddress, StatusHistoryEntry,
};
use fagot_core::order_number::{self, OrderNumberExhausted};
use fagot_core::rows::{HistoryRow, ORDER_COLUMNS, OrderItemRow, OrderRow, ReceiptRow};
use fagot_core::types::{OrderId, PaymentStatus, ProductId, Unit};

use super::RepositoryError;

/// Everything needed to persist a checkout.
pub struct NewOrder {
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub customer_note: Option<String>,
    pub totals: CartTotals,
    pub items: Vec<NewOrderItem>,
}

/// One order line to snapshot, with its live product data.
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit: Unit,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Errors from the checkout transaction.
#[derive(Debug, thiserror::Error)]
pub enum CreateOrderError {
    /// The conditional stock decrement matched no row.
    #[error("insufficient stock for {name}")]
    OutOfStock { name: String },

    /// Ran out of order-number candidates.
    #[error(transparent)]
    NumberExhausted(#[from] OrderNumberExhausted),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CreateOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a checkout as one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CreateOrderError::OutOfStock` when a live stock row cannot
    /// cover a requested quantity, `NumberExhausted` when no free order
    /// number was found, or `Repository` for database failures. The unique
    /// constraint on `orders.order_number` surfaces as
    /// `RepositoryError::Conflict` if a concurrent insert wins the race.
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, CreateOrderError> {
        let mut tx = self.pool.begin().await?;

        // Stock first: a failed decrement aborts before anything is written.
        for item in &new_order.items {
            let result = sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $1, updated_at = NOW()
                WHERE id = $2 AND stock >= $1
                ",
            )
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(item.product_id.as_i64())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CreateOrderError::OutOfStock {
                    name: item.name.clone(),
                });
            }
        }

        let order_number = free_order_number(&mut tx).await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (
                order_number, first_name, last_name, email, phone,
                address_line1, address_line2, postal_code, city,
                subtotal, shipping_cost, tax, total, status, payment_status,
                customer_note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    'pending', 'pending', $14)
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(&order_number)
        .bind(&new_order.customer.first_name)
        .bind(&new_order.customer.last_name)
        .bind(new_order.customer.email.as_str())
        .bind(&new_order.customer.phone)
        .bind(&new_order.shipping_address.line1)
        .bind(&new_order.shipping_address.line2)
        .bind(&new_order.shipping_address.postal_code)
        .bind(&new_order.shipping_address.city)
        .bind(new_order.totals.subtotal)
        .bind(new_order.totals.shipping_cost)
        .bind(new_order.totals.tax)
        .bind(new_order.totals.total)
        .bind(&new_order.customer_note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return CreateOrderError::Repository(RepositoryError::Conflict(
                    "order number already taken".to_owned(),
                ));
            }
            CreateOrderError::from(e)
        })?;

        for item in &new_order.items {
            let quantity = i32::try_from(item.quantity).unwrap_or(i32::MAX);
            let total_price = item.unit_price * Decimal::from(item.quantity);
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, name, unit, unit_price, quantity, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(row.id)
            .bind(item.product_id.as_i64())
            .bind(&item.name)
            .bind(item.unit.as_str())
            .bind(item.unit_price)
            .bind(quantity)
            .bind(total_price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO order_status_history (order_id, status, note)
            VALUES ($1, 'pending', 'order placed')
            ",
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Order::try_from(row).map_err(RepositoryError::from)?)
    }

    /// Load an order with its items, history, and receipts by order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `DataCorruption` on unparseable stored values.
    pub async fn get_detail_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order_id = row.id;
        let order = Order::try_from(row)?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_id, name, unit, unit_price, quantity, total_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let status_history = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT status, note, created_at
            FROM order_status_history
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(StatusHistoryEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let receipts = sqlx::query_as::<_, ReceiptRow>(
            r"
            SELECT filename, url, external_id, uploaded_at
            FROM order_receipts
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Receipt::from)
        .collect();

        Ok(Some(OrderDetail {
            order,
            items,
            status_history,
            receipts,
        }))
    }

    /// Attach an uploaded receipt to an order and, when payment is still
    /// pending, mark it received with a history note.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist,
    /// `Database` for query failures.
    pub async fn attach_receipt(
        &self,
        order_id: OrderId,
        receipt: &Receipt,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String, String)> = sqlx::query_as(
            "SELECT status, payment_status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((status, payment_status)) = current else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query(
            r"
            INSERT INTO order_receipts (order_id, filename, url, external_id, uploaded_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(order_id.as_i64())
        .bind(&receipt.filename)
        .bind(&receipt.url)
        .bind(&receipt.external_id)
        .bind(receipt.uploaded_at)
        .execute(&mut *tx)
        .await?;

        // A pending payment moves to received; the order status itself is
        // untouched, the admin confirms the transfer on their side.
        if payment_status == PaymentStatus::Pending.as_str() {
            sqlx::query(
                "UPDATE orders SET payment_status = 'received', updated_at = NOW() WHERE id = $1",
            )
            .bind(order_id.as_i64())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r"
                INSERT INTO order_status_history (order_id, status, note)
                VALUES ($1, $2, 'payment receipt uploaded')
                ",
            )
            .bind(order_id.as_i64())
            .bind(&status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Walk the bounded candidate sequence and return the first free number.
async fn free_order_number(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<String, CreateOrderError> {
    let today = Utc::now().date_naive();
    let randoms: Vec<u16> = {
        let mut rng = rand::rng();
        (0..order_number::MAX_RANDOM_DRAWS)
            .map(|_| rng.random_range(0..1000))
            .collect()
    };

    let mut attempts = 0usize;
    for candidate in order_number::candidates(today, &randoms) {
        attempts += 1;
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_number = $1)")
                .bind(&candidate)
                .fetch_one(&mut **tx)
                .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(OrderNumberExhausted { attempts }.into())
}
