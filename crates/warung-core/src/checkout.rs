//! # Checkout Planning
//!
//! Turns a finalized POS cart plus a settlement method into the exact
//! records the console will write, in order.
//!
//! ## Step Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request::new()  ── preconditions, nothing written on failure           │
//! │       │              (empty cart, cash short, blank debtor)             │
//! │       ▼                                                                 │
//! │  CheckoutPlan                                                           │
//! │       │                                                                 │
//! │       ├─ 1. CreateOrder      order header, status Completed             │
//! │       ├─ 2. CreateLines      batch of line snapshots                    │
//! │       ├─ 3. PostCashEntry    cash / non-cash: Income = total            │
//! │       │     OpenCreditTab    credit: Open tab = total, linked to order  │
//! │       └─ 4. DecrementStock   per line, floored at 0                     │
//! │                                                                         │
//! │  Failure at step N leaves steps 1..N-1 in place. No rollback.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Planning is pure: ids and timestamps are fixed here so the console only
//! has to execute.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartEntry};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    CashEntry, CashEntryKind, CreditTab, FulfillmentKind, Order, OrderLine, OrderStatus,
    PaymentMethod, TabStatus,
};
use crate::validation::{validate_note, validate_required};

/// Buyer name used when the till does not ask for one.
pub const WALK_IN_BUYER: &str = "Walk-in customer";

/// Note stamped on every order rung up at the till.
pub const POS_ORDER_NOTE: &str = "POS sale";

// =============================================================================
// Write Steps
// =============================================================================

/// A single store write inside a multi-step sequence.
///
/// Shared by checkout, order completion and tab settlement so a failure can
/// be reported as "failed at <step>".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WriteStep {
    CreateOrder,
    CreateLines,
    PostCashEntry,
    OpenCreditTab,
    DecrementStock,
    FetchLines,
    UpdateOrderStatus,
    SettleTab,
    RelabelOrder,
}

impl WriteStep {
    pub fn label(&self) -> &'static str {
        match self {
            WriteStep::CreateOrder => "create order",
            WriteStep::CreateLines => "create order lines",
            WriteStep::PostCashEntry => "post cash entry",
            WriteStep::OpenCreditTab => "open credit tab",
            WriteStep::DecrementStock => "decrement stock",
            WriteStep::FetchLines => "fetch order lines",
            WriteStep::UpdateOrderStatus => "update order status",
            WriteStep::SettleTab => "settle credit tab",
            WriteStep::RelabelOrder => "relabel order payment",
        }
    }
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Cash sale. `tendered` must cover the total.
#[derive(Debug, Clone)]
pub struct CheckoutCashRequest {
    cart: Cart,
    buyer_name: String,
    tendered: Money,
}

impl CheckoutCashRequest {
    /// ## Errors
    /// - `EmptyCart`
    /// - `InsufficientCash` when `tendered < total`
    pub fn new(cart: &Cart, buyer_name: Option<&str>, tendered: i64) -> CoreResult<Self> {
        ensure_not_empty(cart)?;
        let total = cart.total_amount();
        let tendered = Money::from_amount(tendered);

        if total.change_from(tendered).is_negative() {
            return Err(CoreError::InsufficientCash {
                total: total.amount(),
                tendered: tendered.amount(),
            });
        }

        Ok(CheckoutCashRequest {
            cart: cart.clone(),
            buyer_name: buyer_or_walk_in(buyer_name)?,
            tendered,
        })
    }

    /// `tendered - total`, never negative once constructed.
    pub fn change(&self) -> Money {
        self.cart.total_amount().change_from(self.tendered)
    }

    pub fn plan(&self) -> CheckoutPlan {
        let mut plan = build_plan(&self.cart, &self.buyer_name, PaymentMethod::Cash);
        plan.change = Some(self.change());
        plan
    }
}

/// Instant non-cash sale (QR code, transfer).
#[derive(Debug, Clone)]
pub struct CheckoutNonCashRequest {
    cart: Cart,
    buyer_name: String,
}

impl CheckoutNonCashRequest {
    pub fn new(cart: &Cart, buyer_name: Option<&str>) -> CoreResult<Self> {
        ensure_not_empty(cart)?;
        Ok(CheckoutNonCashRequest {
            cart: cart.clone(),
            buyer_name: buyer_or_walk_in(buyer_name)?,
        })
    }

    pub fn plan(&self) -> CheckoutPlan {
        build_plan(&self.cart, &self.buyer_name, PaymentMethod::NonCash)
    }
}

/// Deferred sale recorded on a new credit tab.
#[derive(Debug, Clone)]
pub struct CheckoutCreditRequest {
    cart: Cart,
    debtor_name: String,
}

impl CheckoutCreditRequest {
    /// ## Errors
    /// - `EmptyCart`
    /// - `Validation(Required)` when the debtor name is blank
    pub fn new(cart: &Cart, debtor_name: &str) -> CoreResult<Self> {
        ensure_not_empty(cart)?;
        Ok(CheckoutCreditRequest {
            cart: cart.clone(),
            debtor_name: validate_required("debtor name", debtor_name)?,
        })
    }

    pub fn debtor_name(&self) -> &str {
        &self.debtor_name
    }

    pub fn plan(&self) -> CheckoutPlan {
        build_plan(&self.cart, &self.debtor_name, PaymentMethod::Credit)
    }
}

fn ensure_not_empty(cart: &Cart) -> CoreResult<()> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    Ok(())
}

fn buyer_or_walk_in(buyer_name: Option<&str>) -> CoreResult<String> {
    Ok(validate_note("buyer name", buyer_name)?.unwrap_or_else(|| WALK_IN_BUYER.to_string()))
}

// =============================================================================
// Plan
// =============================================================================

/// Step 3 of a checkout: where the money goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Posting {
    Cash(CashEntry),
    Credit(CreditTab),
}

impl Posting {
    pub fn step(&self) -> WriteStep {
        match self {
            Posting::Cash(_) => WriteStep::PostCashEntry,
            Posting::Credit(_) => WriteStep::OpenCreditTab,
        }
    }
}

/// Stock to take off one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockDecrement {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

/// Everything a checkout will write, already materialised.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub posting: Posting,
    pub decrements: Vec<StockDecrement>,
    /// Change owed; only set for cash.
    pub change: Option<Money>,
}

impl CheckoutPlan {
    /// The writes this plan performs, in execution order.
    pub fn steps(&self) -> [WriteStep; 4] {
        [
            WriteStep::CreateOrder,
            WriteStep::CreateLines,
            self.posting.step(),
            WriteStep::DecrementStock,
        ]
    }
}

fn build_plan(cart: &Cart, buyer_name: &str, method: PaymentMethod) -> CheckoutPlan {
    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        buyer_name: buyer_name.to_string(),
        note: Some(POS_ORDER_NOTE.to_string()),
        total_amount: cart.total_amount().amount(),
        status: OrderStatus::Completed,
        payment_method: method,
        fulfillment: FulfillmentKind::Pickup,
        delivery_address: None,
        created_at: now,
    };

    let lines = order_lines(&order.id, cart.entries());

    let posting = match method {
        PaymentMethod::Credit => Posting::Credit(CreditTab {
            id: Uuid::new_v4().to_string(),
            customer_name: buyer_name.to_string(),
            summary: credit_summary(cart.entries()),
            amount: order.total_amount,
            status: TabStatus::Open,
            order_id: Some(order.id.clone()),
            created_at: now,
            settled_at: None,
            charges: Vec::new(),
        }),
        _ => Posting::Cash(CashEntry {
            id: Uuid::new_v4().to_string(),
            kind: CashEntryKind::Income,
            description: sale_description(&order),
            amount: order.total_amount,
            created_at: now,
        }),
    };

    let decrements = cart
        .entries()
        .iter()
        .map(|e| StockDecrement {
            product_id: e.product_id.clone(),
            product_name: e.name.clone(),
            quantity: e.quantity,
        })
        .collect();

    CheckoutPlan {
        order,
        lines,
        posting,
        decrements,
        change: None,
    }
}

/// Snapshots cart entries as order lines for `order_id`.
pub fn order_lines(order_id: &str, entries: &[CartEntry]) -> Vec<OrderLine> {
    let now = Utc::now();
    entries
        .iter()
        .map(|e| OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: e.product_id.clone(),
            product_name: e.name.clone(),
            quantity: e.quantity,
            unit_price: e.unit_price,
            created_at: now,
        })
        .collect()
}

/// Cash book text for a till sale: `POS sale #1A2B3C4D`, QRIS suffixed.
fn sale_description(order: &Order) -> String {
    match order.payment_method {
        PaymentMethod::NonCash => format!("POS sale #{} (QRIS)", order.short_id()),
        _ => format!("POS sale #{}", order.short_id()),
    }
}

/// Opening text of a credit tab: `POS purchase: Indomie x2, Teh Botol x1`.
pub fn credit_summary(entries: &[CartEntry]) -> String {
    let items = entries
        .iter()
        .map(|e| format!("{} x{}", e.name, e.quantity))
        .collect::<Vec<_>>()
        .join(", ");
    format!("POS purchase: {}", items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Sembako".to_string(),
            unit: "pcs".to_string(),
            price,
            stock: 10,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn cart_p_x2() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&product("p", "Beras 1kg", 10000), 2).unwrap();
        cart
    }

    #[test]
    fn test_cash_plan() {
        let request = CheckoutCashRequest::new(&cart_p_x2(), None, 25000).unwrap();
        assert_eq!(request.change().amount(), 5000);

        let plan = request.plan();
        assert_eq!(plan.order.total_amount, 20000);
        assert_eq!(plan.order.status, OrderStatus::Completed);
        assert_eq!(plan.order.buyer_name, WALK_IN_BUYER);
        assert_eq!(plan.change, Some(Money::from_amount(5000)));
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].order_id, plan.order.id);
        assert_eq!(plan.decrements[0].quantity, 2);

        match &plan.posting {
            Posting::Cash(entry) => {
                assert_eq!(entry.kind, CashEntryKind::Income);
                assert_eq!(entry.amount, 20000);
                assert!(entry.description.contains(&plan.order.short_id()));
            }
            other => panic!("expected cash posting, got {:?}", other),
        }

        assert_eq!(
            plan.steps(),
            [
                WriteStep::CreateOrder,
                WriteStep::CreateLines,
                WriteStep::PostCashEntry,
                WriteStep::DecrementStock
            ]
        );
    }

    #[test]
    fn test_insufficient_cash_rejected() {
        let err = CheckoutCashRequest::new(&cart_p_x2(), None, 15000).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientCash {
                total: 20000,
                tendered: 15000
            }
        ));
    }

    #[test]
    fn test_exact_cash_and_zero_total() {
        let request = CheckoutCashRequest::new(&cart_p_x2(), None, 20000).unwrap();
        assert!(request.change().is_zero());

        let mut free = Cart::new();
        free.add_item(&product("f", "Sample", 0), 1).unwrap();
        assert!(CheckoutCashRequest::new(&free, None, 0).is_ok());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let empty = Cart::new();
        assert!(matches!(
            CheckoutCashRequest::new(&empty, None, 1000),
            Err(CoreError::EmptyCart)
        ));
        assert!(matches!(
            CheckoutNonCashRequest::new(&empty, None),
            Err(CoreError::EmptyCart)
        ));
        assert!(matches!(
            CheckoutCreditRequest::new(&empty, "Bu Sri"),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_non_cash_plan_description() {
        let plan = CheckoutNonCashRequest::new(&cart_p_x2(), Some("Pak Budi"))
            .unwrap()
            .plan();
        assert_eq!(plan.order.payment_method, PaymentMethod::NonCash);
        assert_eq!(plan.order.buyer_name, "Pak Budi");
        assert!(plan.change.is_none());
        match &plan.posting {
            Posting::Cash(entry) => assert!(entry.description.ends_with("(QRIS)")),
            other => panic!("expected cash posting, got {:?}", other),
        }
    }

    #[test]
    fn test_credit_plan_opens_tab() {
        let mut cart = cart_p_x2();
        cart.add_item(&product("t", "Teh Botol", 5000), 1).unwrap();

        let plan = CheckoutCreditRequest::new(&cart, "  Bu Sri ").unwrap().plan();
        assert_eq!(plan.order.payment_method, PaymentMethod::Credit);
        assert_eq!(plan.order.status, OrderStatus::Completed);
        assert_eq!(plan.steps()[2], WriteStep::OpenCreditTab);

        match &plan.posting {
            Posting::Credit(tab) => {
                assert_eq!(tab.customer_name, "Bu Sri");
                assert_eq!(tab.amount, 25000);
                assert_eq!(tab.status, TabStatus::Open);
                assert_eq!(tab.order_id.as_deref(), Some(plan.order.id.as_str()));
                assert_eq!(tab.summary, "POS purchase: Beras 1kg x2, Teh Botol x1");
            }
            other => panic!("expected credit posting, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_debtor_rejected() {
        let err = CheckoutCreditRequest::new(&cart_p_x2(), "   ").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(WriteStep::DecrementStock.to_string(), "decrement stock");
        assert_eq!(WriteStep::CreateLines.label(), "create order lines");
    }
}
