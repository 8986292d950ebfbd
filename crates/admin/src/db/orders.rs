//! Order repository for the back office: listing, detail, transitions.
//!
//! The status ledger is append-only. Every status change goes through
//! `update_status`, which checks the transition table before touching the
//! row, so the history always reads as a legal path through the machine.
//! The in-memory model of these semantics lives in [`fagot_core::order`]
//! as `StatusLedger`; this repository mirrors it in SQL.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use fagot_core::order::{
    Order, OrderDetail, OrderItem, Receipt, StatusHistoryEntry, quote_marker, quote_note,
    quote_transition,
};
use fagot_core::rows::{HistoryRow, ORDER_COLUMNS, OrderItemRow, OrderRow, ReceiptRow};
use fagot_core::types::{InvalidTransition, OrderId, OrderStatus};

use super::RepositoryError;

/// One page of the order list.
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// Errors from a status update.
#[derive(Debug, thiserror::Error)]
pub enum UpdateStatusError {
    /// The transition table forbids this edge.
    #[error(transparent)]
    Invalid(#[from] InvalidTransition),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for UpdateStatusError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for back-office order operations.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `DataCorruption` on unparseable stored values.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<OrderPage, RepositoryError> {
        let status_text = status.map(OrderStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE $1::text IS NULL OR status = $1",
        )
        .bind(status_text)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE $1::text IS NULL OR status = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(status_text)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage { orders, total })
    }

    /// Load an order with its items, history, and receipts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `DataCorruption` on unparseable stored values.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let row =
            sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Order::try_from(row)?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT product_id, name, unit, unit_price, quantity, total_price
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let status_history = sqlx::query_as::<_, HistoryRow>(
            "SELECT status, note, created_at
             FROM order_status_history WHERE order_id = $1 ORDER BY id",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(StatusHistoryEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let receipts = sqlx::query_as::<_, ReceiptRow>(
            "SELECT filename, url, external_id, uploaded_at
             FROM order_receipts WHERE order_id = $1 ORDER BY id",
        )
        .bind(id.as_i64())
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

    /// Move an order to a new status and append the matching history entry
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `UpdateStatusError::Invalid` when the transition table
    /// forbids the edge, `Repository(NotFound)` for an unknown id.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        note: Option<&str>,
    ) -> Result<Order, UpdateStatusError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_status(&mut tx, id).await?;
        current.transition_to(next)?;

        let row = set_status(&mut tx, id, next, note).await?;

        tx.commit().await?;

        Ok(Order::try_from(row).map_err(RepositoryError::from)?)
    }

    /// True when a history note already carries this quote request marker.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_quote_marker(
        &self,
        id: OrderId,
        request_id: &str,
    ) -> Result<bool, RepositoryError> {
        let marker = quote_marker(request_id);
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM order_status_history
                 WHERE order_id = $1 AND note LIKE '%' || $2 || '%'
             )",
        )
        .bind(id.as_i64())
        .bind(marker)
        .fetch_one(self.pool)
        .await?;

        Ok(found)
    }

    /// Record that a quote went out. A pending order moves to `confirmed`;
    /// an already-confirmed order only gets the history note (resend).
    ///
    /// # Errors
    ///
    /// Returns `Repository(NotFound)` for an unknown id, `Invalid` when the
    /// order sits in a state quotes cannot be sent from.
    pub async fn record_quote_sent(
        &self,
        id: OrderId,
        amount: Decimal,
        request_id: Option<&str>,
    ) -> Result<Order, UpdateStatusError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_status(&mut tx, id).await?;
        let next = quote_transition(current)?;
        let note = quote_note(amount, request_id);

        let row = set_status(&mut tx, id, next, Some(&note)).await?;

        tx.commit().await?;

        Ok(Order::try_from(row).map_err(RepositoryError::from)?)
    }
}

/// Lock an order row and parse its current status.
async fn lock_status(
    tx: &mut Transaction<'_, Postgres>,
    id: OrderId,
) -> Result<OrderStatus, UpdateStatusError> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut **tx)
            .await?;

    let Some(status) = status else {
        return Err(UpdateStatusError::Repository(RepositoryError::NotFound));
    };

    status.parse().map_err(|e| {
        UpdateStatusError::Repository(RepositoryError::DataCorruption(format!(
            "invalid status in database: {e}"
        )))
    })
}

/// Write the new status and append its ledger entry. Callers hold the row
/// lock and have already validated the transition.
async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    id: OrderId,
    next: OrderStatus,
    note: Option<&str>,
) -> Result<OrderRow, sqlx::Error> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders SET status = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id.as_i64())
    .bind(next.as_str())
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO order_status_history (order_id, status, note) VALUES ($1, $2, $3)")
        .bind(id.as_i64())
        .bind(next.as_str())
        .bind(note)
        .execute(&mut **tx)
        .await?;

    Ok(row)
}
