//! # Order Lifecycle Rules
//!
//! ```text
//!            complete  ┌───────────┐
//!          ┌─────────► │ Completed │  terminal
//! ┌─────────┐          └───────────┘
//! │ Pending │
//! └─────────┘ cancel   ┌───────────┐
//!          └─────────► │ Cancelled │  terminal
//!                      └───────────┘
//! ```
//!
//! Completing a storefront order is where its stock leaves the shelf: the
//! status flip claims the order, then one floored decrement per line, then
//! one Income entry. Cancelling only flips the status.

use chrono::Utc;
use uuid::Uuid;

use crate::checkout::{StockDecrement, WriteStep};
use crate::error::{CoreError, CoreResult};
use crate::types::{CashEntry, CashEntryKind, Order, OrderLine, OrderStatus};

/// Checks that `order` may move to `target`.
///
/// Only `Pending → Completed` and `Pending → Cancelled` are allowed.
pub fn ensure_transition(order: &Order, target: OrderStatus) -> CoreResult<()> {
    let allowed = order.status == OrderStatus::Pending
        && matches!(target, OrderStatus::Completed | OrderStatus::Cancelled);

    if !allowed {
        return Err(CoreError::InvalidOrderStatus {
            order_id: order.id.clone(),
            current_status: order.status.as_str().to_string(),
        });
    }
    Ok(())
}

/// What completing an order writes, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionPlan {
    pub order_id: String,
    pub decrements: Vec<StockDecrement>,
    pub entry: CashEntry,
}

impl CompletionPlan {
    pub fn steps(&self) -> [WriteStep; 3] {
        [
            WriteStep::UpdateOrderStatus,
            WriteStep::DecrementStock,
            WriteStep::PostCashEntry,
        ]
    }
}

/// Plans the completion of a pending order from its lines.
pub fn plan_completion(order: &Order, lines: &[OrderLine]) -> CoreResult<CompletionPlan> {
    ensure_transition(order, OrderStatus::Completed)?;

    let decrements = lines
        .iter()
        .map(|line| StockDecrement {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
        })
        .collect();

    Ok(CompletionPlan {
        order_id: order.id.clone(),
        decrements,
        entry: CashEntry {
            id: Uuid::new_v4().to_string(),
            kind: CashEntryKind::Income,
            description: format!("Order {}", order.short_id()),
            amount: order.total_amount,
            created_at: Utc::now(),
        },
    })
}
