//! # Domain Types
//!
//! Core domain entities for the shop.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Entity Relationship Diagram                       │
//! │                                                                         │
//! │  ┌──────────┐  name copy   ┌──────────┐                                │
//! │  │ Category │ ◄─ ─ ─ ─ ─ ─ │ Product  │ ─ ─ ─ ─ ─ ─► ┌──────┐          │
//! │  └──────────┘              └────┬─────┘  name copy   │ Unit │          │
//! │                                 │ weak ref           └──────┘          │
//! │                                 ▼                                       │
//! │  ┌──────────┐   1:N      ┌───────────┐                                 │
//! │  │  Order   │ ─────────► │ OrderLine │  (name + price snapshot)        │
//! │  └────┬─────┘            └───────────┘                                 │
//! │       │ optional link                                                   │
//! │       ▼                                                                 │
//! │  ┌───────────┐  1:N  ┌──────────────┐      ┌────────────┐             │
//! │  │ CreditTab │ ────► │ CreditCharge │      │ CashEntry  │ append-only │
//! │  └───────────┘       └──────────────┘      └────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Category and unit on a product are denormalized name strings, not foreign
//! keys. Renaming a category leaves existing products untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the catalog and on order lines.
    pub name: String,

    /// Category name (free-form copy of `Category.name`).
    pub category: String,

    /// Unit label, e.g. "pcs", "kg", "bungkus".
    pub unit: String,

    /// Price in the smallest currency unit.
    pub price: i64,

    /// Sellable units on hand. Never negative.
    pub stock: i64,

    /// Public image reference, if a photo was uploaded.
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_amount(self.price)
    }

    /// True when nothing is left to sell.
    #[inline]
    pub fn is_sold_out(&self) -> bool {
        self.stock <= 0
    }
}

// =============================================================================
// Reference Lists
// =============================================================================

/// A product category. Products copy the name, they do not reference the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A unit label (pcs, kg, liter...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ```text
///            ┌──────────► Completed
///  Pending ──┤
///            └──────────► Cancelled
/// ```
/// Both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed from the storefront, waiting for the operator.
    Pending,
    /// Goods handed over and money posted.
    Completed,
    /// Abandoned before fulfilment.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and Cancelled accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Instant non-cash payment (QR code, transfer).
    NonCash,
    /// Deferred, recorded on a credit tab.
    Credit,
    /// Was credit, the tab has since been settled in cash.
    CreditSettled,
}

impl PaymentMethod {
    /// Human-readable label used in messages and ledger descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::NonCash => "Non-cash (QRIS)",
            PaymentMethod::Credit => "Credit",
            PaymentMethod::CreditSettled => "Cash (credit settled)",
        }
    }
}

// =============================================================================
// Fulfillment
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentKind {
    /// Customer collects at the counter (all POS sales).
    Pickup,
    /// Shop delivers to `Order.delivery_address`.
    Delivery,
}

impl FulfillmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            FulfillmentKind::Pickup => "Pickup",
            FulfillmentKind::Delivery => "Delivery",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order header. Lines live in [`OrderLine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub buyer_name: String,
    pub note: Option<String>,
    /// Sum of the lines' quantity × unit price at submission time.
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub fulfillment: FulfillmentKind,
    pub delivery_address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// First eight characters of the id, upper-cased.
    ///
    /// Used on receipts, messages and ledger descriptions.
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_amount(self.total_amount)
    }
}

/// Shortens any UUID string the way orders are referred to in the shop.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}

// =============================================================================
// Order Line
// =============================================================================

/// One product's quantity and price snapshot within an order.
///
/// `product_id` is a weak reference: it may dangle after the product is
/// deleted, which is why name and price are copied here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        Money::from_amount(self.unit_price).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cash Ledger
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashEntryKind {
    Income,
    Expense,
}

/// An append-only cash book entry. `amount` is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashEntry {
    pub id: String,
    pub kind: CashEntryKind,
    pub description: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Credit Tab
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    Open,
    Settled,
}

impl TabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabStatus::Open => "open",
            TabStatus::Settled => "settled",
        }
    }
}

/// A customer's running pay-later balance.
///
/// `summary` is the text written when the tab was opened. The full
/// human-readable history is generated from it plus `charges`, see
/// [`CreditTab::description`](crate::credit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditTab {
    pub id: String,
    pub customer_name: String,
    pub summary: String,
    /// Outstanding total. Only grows while Open; kept as history once Settled.
    pub amount: i64,
    pub status: TabStatus,
    pub order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub settled_at: Option<DateTime<Utc>>,
    /// Charges added after opening, oldest first.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub charges: Vec<CreditCharge>,
}

/// One incremental charge on a credit tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditCharge {
    pub id: String,
    pub tab_id: String,
    pub amount: i64,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub charged_at: DateTime<Utc>,
}

// =============================================================================
// Storefront Section
// =============================================================================

/// A featured group of products on the storefront home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StorefrontSection {
    pub id: String,
    pub name: String,
    pub display_order: i64,
    /// Featured products, in the order they should be shown.
    pub product_ids: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
