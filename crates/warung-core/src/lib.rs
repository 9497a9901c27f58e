//! # warung-core: Pure Business Logic for Warung POS
//!
//! Everything the shop decides, with none of the I/O. The store layer and
//! the console call into this crate; this crate calls nothing.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Warung POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          apps/console (orchestration, state, commands)          │   │
//! │  │   checkout_cash ─ complete_order ─ settle_tab ─ storefront      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ warung-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   cart ─ stock ─ checkout ─ lifecycle ─ credit                  │   │
//! │  │   storefront ─ message ─ ledger ─ catalog                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plans                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 warung-db (SQLite store)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Order, CreditTab, ...)
//! - [`money`] - Integer money with `Rp 29.000` formatting
//! - [`cart`] - Cart Engine (storefront cart and bounded POS cart)
//! - [`stock`] - Stock Ledger View
//! - [`checkout`] - Validated checkout requests and their write plans
//! - [`lifecycle`] - Order status transitions and completion plans
//! - [`credit`] - Credit tab charges and settlement
//! - [`storefront`] - Customer checkout into a Pending order
//! - [`message`] - Messaging handoff text and link
//! - [`ledger`] - Expenses and monthly cash summary
//! - [`catalog`] - Search, categories, sections, low stock
//! - [`validation`] / [`error`]
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use warung_core::{Cart, Product};
//! use warung_core::checkout::CheckoutCashRequest;
//!
//! let beras = Product {
//!     id: "p1".into(),
//!     name: "Beras 1kg".into(),
//!     category: "Sembako".into(),
//!     unit: "kg".into(),
//!     price: 10000,
//!     stock: 8,
//!     image_url: None,
//!     created_at: Utc::now(),
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&beras, 2).unwrap();
//!
//! let request = CheckoutCashRequest::new(&cart, None, 25000).unwrap();
//! assert_eq!(request.change().to_string(), "Rp 5.000");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod credit;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod message;
pub mod money;
pub mod stock;
pub mod storefront;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartEntry, CartTotals, PosCart};
pub use checkout::WriteStep;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use stock::StockLedger;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single item in one request.
///
/// Catches slips like typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default low-stock threshold for the dashboard.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
