//! # Checkout Commands
//!
//! Turns the till cart into durable records, one entry point per
//! settlement method.
//!
//! ## Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request::new(cart, ...)   ◄── validation: empty cart, short cash,      │
//! │        │                       blank debtor. Nothing written on error.  │
//! │        ▼                                                                │
//! │  1. create order (Completed)                                            │
//! │  2. create order lines (price/qty snapshot)                             │
//! │  3. cash/non-cash: post Income entry │ credit: open credit tab          │
//! │  4. decrement stock per line, floored at 0                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  5. clear the till cart, refresh the stock view                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing step stops the sequence. Earlier steps stay committed and the
//! error names the step and the order id for manual reconciliation.

use serde::Serialize;
use tracing::{debug, info, warn};
use warung_core::checkout::{
    CheckoutCashRequest, CheckoutCreditRequest, CheckoutNonCashRequest, CheckoutPlan, Posting,
};
use warung_core::{PaymentMethod, WriteStep};
use warung_db::Database;

use super::sequence::Sequence;
use crate::error::ApiError;
use crate::state::{DbState, PosCartState, StockState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub short_id: String,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    /// Change to hand back; cash only
    pub change: Option<i64>,
    /// Credit tab opened for this sale; credit only
    pub tab_id: Option<String>,
    /// Lines whose product no longer exists, so no stock was taken
    pub skipped_products: Vec<String>,
}

/// Cash sale. `tendered` must cover the total.
pub async fn checkout_cash(
    db: &DbState,
    cart: &PosCartState,
    stock: &StockState,
    buyer_name: Option<&str>,
    tendered: i64,
) -> Result<CheckoutResponse, ApiError> {
    debug!(tendered, "checkout_cash command");
    let request = cart.with_cart(|c| CheckoutCashRequest::new(c.as_cart(), buyer_name, tendered))?;
    finish(db, cart, stock, request.plan()).await
}

/// QRIS / transfer sale.
pub async fn checkout_non_cash(
    db: &DbState,
    cart: &PosCartState,
    stock: &StockState,
    buyer_name: Option<&str>,
) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout_non_cash command");
    let request = cart.with_cart(|c| CheckoutNonCashRequest::new(c.as_cart(), buyer_name))?;
    finish(db, cart, stock, request.plan()).await
}

/// Pay-later sale, booked on a new credit tab for `debtor_name`.
pub async fn checkout_credit(
    db: &DbState,
    cart: &PosCartState,
    stock: &StockState,
    debtor_name: &str,
) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout_credit command");
    let request = cart.with_cart(|c| CheckoutCreditRequest::new(c.as_cart(), debtor_name))?;
    finish(db, cart, stock, request.plan()).await
}

async fn finish(
    db: &DbState,
    cart: &PosCartState,
    stock: &StockState,
    plan: CheckoutPlan,
) -> Result<CheckoutResponse, ApiError> {
    let skipped_products = execute(db.inner(), &plan).await?;

    cart.with_cart_mut(|c| c.clear());
    if let Err(e) = stock.refresh(db.inner()).await {
        // The sale is recorded; only the view is stale until the next refresh
        warn!(error = %e, "Stock refresh after checkout failed");
    }

    let order = &plan.order;
    info!(
        order_id = %order.id,
        method = ?order.payment_method,
        total = %order.total(),
        lines = plan.lines.len(),
        "Checkout completed"
    );

    Ok(CheckoutResponse {
        order_id: order.id.clone(),
        short_id: order.short_id(),
        payment_method: order.payment_method,
        total_amount: order.total_amount,
        change: plan.change.map(|c| c.amount()),
        tab_id: match &plan.posting {
            Posting::Credit(tab) => Some(tab.id.clone()),
            Posting::Cash(_) => None,
        },
        skipped_products,
    })
}

/// Runs the four writes of `plan` in order.
async fn execute(db: &Database, plan: &CheckoutPlan) -> Result<Vec<String>, ApiError> {
    let mut seq = Sequence::new("checkout", Some(plan.order.id.as_str()));

    seq.run(WriteStep::CreateOrder, db.orders().insert(&plan.order)).await?;
    seq.run(WriteStep::CreateLines, db.orders().insert_lines(&plan.lines)).await?;

    match &plan.posting {
        Posting::Cash(entry) => {
            seq.run(WriteStep::PostCashEntry, db.cash_entries().insert(entry)).await?
        }
        Posting::Credit(tab) => {
            seq.run(WriteStep::OpenCreditTab, db.credit_tabs().insert(tab)).await?
        }
    }

    let mut skipped = Vec::new();
    for d in &plan.decrements {
        let found = seq
            .run(
                WriteStep::DecrementStock,
                db.products().decrement_stock(&d.product_id, d.quantity),
            )
            .await?;
        if !found {
            warn!(product_id = %d.product_id, product = %d.product_name, "Product gone, stock not decremented");
            skipped.push(d.product_name.clone());
        }
    }

    debug!(steps = ?seq.completed(), "Checkout writes done");
    Ok(skipped)
}
