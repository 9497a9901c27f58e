//! # Order Commands
//!
//! Admin handling of orders, mostly those placed from the storefront.
//!
//! ## State Machine
//! ```text
//!            complete_order            ┌───────────┐
//!        ┌────────────────────────────►│ Completed │  (terminal)
//! ┌──────┴──┐                          └───────────┘
//! │ Pending │
//! └──────┬──┘  cancel_order            ┌───────────┐
//!        └────────────────────────────►│ Cancelled │  (terminal)
//!                                      └───────────┘
//! ```
//!
//! Completing takes the stock and books the money; cancelling touches
//! neither. Deleting removes the record and leaves stock and cash history
//! alone.

use serde::Serialize;
use tracing::{debug, info, warn};
use warung_core::lifecycle::{ensure_transition, plan_completion};
use warung_core::validation::validate_uuid;
use warung_core::{Order, OrderLine, OrderStatus, WriteStep};

use super::sequence::Sequence;
use crate::error::ApiError;
use crate::prompt::{Confirm, Outcome};
use crate::state::{DbState, OrderLineCache, StockState};

/// Size of the "new orders" list next to the bell.
pub const RECENT_ORDER_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub order_id: String,
    pub cash_entry_id: String,
    pub amount: i64,
    /// Lines whose product no longer exists
    pub skipped_products: Vec<String>,
}

/// All orders, newest first.
pub async fn list_orders(db: &DbState) -> Result<Vec<Order>, ApiError> {
    Ok(db.inner().orders().list().await?)
}

pub async fn recent_orders(db: &DbState) -> Result<Vec<Order>, ApiError> {
    Ok(db.inner().orders().recent(RECENT_ORDER_LIMIT).await?)
}

async fn load_order(db: &DbState, order_id: &str) -> Result<Order, ApiError> {
    db.inner()
        .orders()
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))
}

/// Lines of an order, from the cache after the first call.
pub async fn fetch_lines(
    db: &DbState,
    cache: &OrderLineCache,
    order_id: &str,
) -> Result<Vec<OrderLine>, ApiError> {
    if let Some(lines) = cache.get(order_id) {
        return Ok(lines);
    }

    let lines = db.inner().orders().lines(order_id).await?;
    cache.insert(order_id, lines.clone());
    Ok(lines)
}

/// Completes a pending order: status, stock out, cash in.
///
/// ## Write Sequence
/// 1. status → Completed, only if the order is still pending
/// 2. decrement stock per line (floored, deleted products skipped)
/// 3. Income entry for the order total
///
/// Step 1 is the claim on the order: when another terminal completed or
/// cancelled it first, nothing else is written.
pub async fn complete_order(
    db: &DbState,
    cache: &OrderLineCache,
    stock: &StockState,
    confirm: &dyn Confirm,
    order_id: &str,
) -> Result<Outcome<CompletionReport>, ApiError> {
    debug!(order_id, "complete_order command");
    validate_uuid(order_id)?;

    let order = load_order(db, order_id).await?;
    ensure_transition(&order, OrderStatus::Completed)?;

    let prompt = format!(
        "Complete order #{} from {} for {}?",
        order.short_id(),
        order.buyer_name,
        order.total()
    );
    if !confirm.confirm(&prompt) {
        return Ok(Outcome::Declined);
    }

    let lines = fetch_lines(db, cache, order_id)
        .await
        .map_err(|e| ApiError::failed_at(WriteStep::FetchLines, &[], Some(order_id), e))?;
    let plan = plan_completion(&order, &lines)?;

    let mut seq = Sequence::new("complete_order", Some(order_id));

    seq.run(
        WriteStep::UpdateOrderStatus,
        db.inner().orders().update_status(order_id, OrderStatus::Completed),
    )
    .await?;

    let products = db.inner().products();
    let mut skipped_products = Vec::new();
    for d in &plan.decrements {
        let found = seq
            .run(
                WriteStep::DecrementStock,
                products.decrement_stock(&d.product_id, d.quantity),
            )
            .await?;
        if !found {
            warn!(order_id, product = %d.product_name, "Product gone, stock not decremented");
            skipped_products.push(d.product_name.clone());
        }
    }

    seq.run(
        WriteStep::PostCashEntry,
        db.inner().cash_entries().insert(&plan.entry),
    )
    .await?;

    if let Err(e) = stock.refresh(db.inner()).await {
        warn!(error = %e, "Stock refresh after completion failed");
    }

    info!(order_id, amount = plan.entry.amount, "Order completed");
    Ok(Outcome::Done(CompletionReport {
        order_id: order_id.to_string(),
        cash_entry_id: plan.entry.id.clone(),
        amount: plan.entry.amount,
        skipped_products,
    }))
}

/// Cancels a pending order. No stock or cash effect.
pub async fn cancel_order(
    db: &DbState,
    confirm: &dyn Confirm,
    order_id: &str,
) -> Result<Outcome<Order>, ApiError> {
    debug!(order_id, "cancel_order command");
    validate_uuid(order_id)?;

    let mut order = load_order(db, order_id).await?;
    ensure_transition(&order, OrderStatus::Cancelled)?;

    if !confirm.confirm(&format!("Cancel order #{}?", order.short_id())) {
        return Ok(Outcome::Declined);
    }

    db.inner()
        .orders()
        .update_status(order_id, OrderStatus::Cancelled)
        .await?;
    order.status = OrderStatus::Cancelled;

    info!(order_id, "Order cancelled");
    Ok(Outcome::Done(order))
}

/// Permanently deletes an order and its lines, whatever its status.
pub async fn delete_order(
    db: &DbState,
    cache: &OrderLineCache,
    confirm: &dyn Confirm,
    order_id: &str,
) -> Result<Outcome<()>, ApiError> {
    debug!(order_id, "delete_order command");
    validate_uuid(order_id)?;

    let order = load_order(db, order_id).await?;
    if !confirm.confirm(&format!("Delete order #{} permanently?", order.short_id())) {
        return Ok(Outcome::Declined);
    }

    db.inner().orders().delete(order_id).await?;
    cache.invalidate(order_id);

    info!(order_id, "Order deleted");
    Ok(Outcome::Done(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::prompt::{AutoConfirm, AutoDecline};
    use crate::test_support::{fail_on, seed_product, stock_of, stocked};
    use chrono::Utc;
    use uuid::Uuid;
    use warung_core::checkout::order_lines;
    use warung_core::{Cart, CashEntryKind, FulfillmentKind, PaymentMethod, Product};

    async fn pending_order(db: &DbState, items: &[(&Product, i64)]) -> Order {
        let mut cart = Cart::new();
        for (p, qty) in items {
            cart.add_item(p, *qty).unwrap();
        }
        let order = Order {
            id: Uuid::new_v4().to_string(),
            buyer_name: "Rina".to_string(),
            note: None,
            total_amount: cart.total_amount().amount(),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cash,
            fulfillment: FulfillmentKind::Pickup,
            delivery_address: None,
            created_at: Utc::now(),
        };
        db.inner().orders().insert(&order).await.unwrap();
        db.inner()
            .orders()
            .insert_lines(&order_lines(&order.id, cart.entries()))
            .await
            .unwrap();
        order
    }

    #[tokio::test]
    async fn test_complete_order() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let b = seed_product(&db, "Telur", 2200, 1).await;
        let order = pending_order(&db, &[(&a, 4), (&b, 3)]).await;
        let stock = stocked(&db).await;
        let cache = OrderLineCache::new();

        let report = complete_order(&db, &cache, &stock, &AutoConfirm, &order.id)
            .await
            .unwrap()
            .done()
            .unwrap();

        assert_eq!(report.amount, 20600);
        assert_eq!(stock_of(&db, &a.id).await, 6);
        assert_eq!(stock_of(&db, &b.id).await, 0);
        assert_eq!(stock.available(&a.id), 6);

        let stored = db.inner().orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);

        let entries = db.inner().cash_entries().list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, CashEntryKind::Income);
        assert_eq!(entries[0].amount, 20600);
        assert!(cache.contains(&order.id));
    }

    #[tokio::test]
    async fn test_declined_completion_writes_nothing() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let stock = stocked(&db).await;

        let outcome = complete_order(&db, &OrderLineCache::new(), &stock, &AutoDecline, &order.id)
            .await
            .unwrap();

        assert!(outcome.is_declined());
        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert!(db.inner().cash_entries().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_orders_cannot_move() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 1)]).await;
        let stock = stocked(&db).await;

        cancel_order(&db, &AutoConfirm, &order.id).await.unwrap();

        let err = complete_order(&db, &OrderLineCache::new(), &stock, &AutoConfirm, &order.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = cancel_order(&db, &AutoConfirm, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(stock_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_cancel_has_no_side_effects() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 2)]).await;

        let cancelled = cancel_order(&db, &AutoConfirm, &order.id)
            .await
            .unwrap()
            .done()
            .unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert!(db.inner().cash_entries().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_stock_taken() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let stock = stocked(&db).await;
        fail_on(&db, "cash_entries", "INSERT", "ledger closed").await;

        let err = complete_order(&db, &OrderLineCache::new(), &stock, &AutoConfirm, &order.id)
            .await
            .unwrap_err();

        assert!(err.is_partial());
        assert_eq!(err.step, Some(WriteStep::PostCashEntry));
        assert!(err.message.contains("ledger closed"));
        assert_eq!(stock_of(&db, &a.id).await, 8);
        let stored = db.inner().orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_concurrent_completions_post_once() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 8).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let stock = stocked(&db).await;
        let cache = OrderLineCache::new();

        let (first, second) = tokio::join!(
            complete_order(&db, &cache, &stock, &AutoConfirm, &order.id),
            complete_order(&db, &cache, &stock, &AutoConfirm, &order.id),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        assert_eq!(stock_of(&db, &a.id).await, 6);
        let entries = db.inner().cash_entries().list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 7000);
    }

    #[tokio::test]
    async fn test_complete_racing_cancel_has_one_winner() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 8).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let stock = stocked(&db).await;
        let cache = OrderLineCache::new();

        let (completed, cancelled) = tokio::join!(
            complete_order(&db, &cache, &stock, &AutoConfirm, &order.id),
            cancel_order(&db, &AutoConfirm, &order.id),
        );
        assert!(completed.is_ok() != cancelled.is_ok());

        let stored = db.inner().orders().get_by_id(&order.id).await.unwrap().unwrap();
        let entries = db.inner().cash_entries().list().await.unwrap();
        if completed.is_ok() {
            assert_eq!(stored.status, OrderStatus::Completed);
            assert_eq!(stock_of(&db, &a.id).await, 6);
            assert_eq!(entries.len(), 1);
        } else {
            assert_eq!(completed.unwrap_err().code, ErrorCode::BusinessLogic);
            assert_eq!(stored.status, OrderStatus::Cancelled);
            assert_eq!(stock_of(&db, &a.id).await, 8);
            assert!(entries.is_empty());
        }
    }

    #[tokio::test]
    async fn test_deleted_product_line_skipped() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let b = seed_product(&db, "Kecap", 9500, 10).await;
        let order = pending_order(&db, &[(&a, 1), (&b, 1)]).await;
        db.inner().products().delete(&b.id).await.unwrap();
        let stock = stocked(&db).await;

        let report = complete_order(&db, &OrderLineCache::new(), &stock, &AutoConfirm, &order.id)
            .await
            .unwrap()
            .done()
            .unwrap();

        assert_eq!(report.skipped_products, vec!["Kecap".to_string()]);
        assert_eq!(report.amount, 13000);
        assert_eq!(stock_of(&db, &a.id).await, 9);
    }

    #[tokio::test]
    async fn test_fetch_lines_cached() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let cache = OrderLineCache::new();

        let first = fetch_lines(&db, &cache, &order.id).await.unwrap();
        // Served from the cache even once the store no longer has them
        sqlx::query("DELETE FROM order_lines")
            .execute(db.inner().pool())
            .await
            .unwrap();
        let second = fetch_lines(&db, &cache, &order.id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_order() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        let order = pending_order(&db, &[(&a, 2)]).await;
        let cache = OrderLineCache::new();
        fetch_lines(&db, &cache, &order.id).await.unwrap();

        let declined = delete_order(&db, &cache, &AutoDecline, &order.id).await.unwrap();
        assert!(declined.is_declined());
        assert!(db.inner().orders().get_by_id(&order.id).await.unwrap().is_some());

        delete_order(&db, &cache, &AutoConfirm, &order.id).await.unwrap();
        assert!(db.inner().orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.inner().orders().lines(&order.id).await.unwrap().is_empty());
        assert!(!cache.contains(&order.id));

        let err = delete_order(&db, &cache, &AutoConfirm, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_order_id_rejected() {
        let db = DbState::in_memory().await.unwrap();
        let stock = stocked(&db).await;
        let cache = OrderLineCache::new();

        let err = complete_order(&db, &cache, &stock, &AutoConfirm, "42")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = cancel_order(&db, &AutoConfirm, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let unknown = Uuid::new_v4().to_string();
        let err = cancel_order(&db, &AutoConfirm, &unknown).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_recent_orders_limited() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Indomie", 3500, 10).await;
        for _ in 0..7 {
            pending_order(&db, &[(&a, 1)]).await;
        }

        assert_eq!(recent_orders(&db).await.unwrap().len(), 5);
        assert_eq!(list_orders(&db).await.unwrap().len(), 7);
    }
}
