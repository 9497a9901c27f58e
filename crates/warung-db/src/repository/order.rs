//! # Order Repository
//!
//! Order headers and their line items.
//!
//! ## Write Shape
//! ```text
//! insert(order)          ── one row, then StoreEvent::OrderInserted
//! insert_lines(lines)    ── one transaction: all lines or none
//! update_status(id, s)   ── Pending → Completed / Cancelled, guarded
//! update_payment_method  ── cosmetic relabel after a tab is settled
//! delete(id)             ── lines go with it (ON DELETE CASCADE)
//! ```
//! Lines are immutable after insert; there is no update for them.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::StoreEvent;
use warung_core::{Order, OrderLine, OrderStatus, PaymentMethod};

const SELECT_ORDER: &str = "SELECT id, buyer_name, note, total_amount, status, payment_method, \
                            fulfillment, delivery_address, created_at FROM orders";

const SELECT_LINE: &str = "SELECT id, order_id, product_id, product_name, quantity, unit_price, \
                           created_at FROM order_lines";

/// Repository for orders and order lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    events: broadcast::Sender<StoreEvent>,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool, events: broadcast::Sender<StoreEvent>) -> Self {
        OrderRepository { pool, events }
    }

    /// Inserts an order header and announces it on the change feed.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = order.total_amount, status = ?order.status, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, buyer_name, note, total_amount, status, payment_method,
                fulfillment, delivery_address, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.buyer_name)
        .bind(&order.note)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.payment_method)
        .bind(order.fulfillment)
        .bind(&order.delivery_address)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        // No subscribers is fine
        let receivers = self
            .events
            .send(StoreEvent::OrderInserted(order.clone()))
            .unwrap_or(0);
        debug!(id = %order.id, receivers = receivers, "Published order insert");

        Ok(())
    }

    /// Inserts a batch of lines atomically.
    pub async fn insert_lines(&self, lines: &[OrderLine]) -> DbResult<()> {
        debug!(count = lines.len(), "Inserting order lines");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, product_name, quantity, unit_price, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{} WHERE id = ?", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// All orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_ORDER
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// The `limit` newest orders.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{} ORDER BY created_at DESC, rowid DESC LIMIT ?",
            SELECT_ORDER
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Orders created in `[start, end)`.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{} WHERE created_at >= ? AND created_at < ? ORDER BY created_at",
            SELECT_ORDER
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lines of an order, in insertion order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "{} WHERE order_id = ? ORDER BY rowid",
            SELECT_LINE
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(order_id = %order_id, count = lines.len(), "Fetched order lines");
        Ok(lines)
    }

    /// Moves a pending order to `status`.
    ///
    /// The update only matches a row that is still `pending`, so of two
    /// terminals racing on the same order exactly one wins. The loser gets
    /// [`DbError::Conflict`] naming the status it found.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(id = %id, status = ?status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(status)
            .bind(id)
            .bind(OrderStatus::Pending)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let current: Option<OrderStatus> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match current {
                None => DbError::not_found("Order", id),
                Some(found) => {
                    DbError::conflict("Order", id, format!("already {}", found.as_str()))
                }
            });
        }
        Ok(())
    }

    pub async fn update_payment_method(&self, id: &str, method: PaymentMethod) -> DbResult<()> {
        debug!(id = %id, method = ?method, "Relabelling order payment");

        let result = sqlx::query("UPDATE orders SET payment_method = ? WHERE id = ?")
            .bind(method)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }

    /// Permanently removes an order and its lines.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }
}
