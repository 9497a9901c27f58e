//! # Console Commands
//!
//! Everything an operator or customer action can trigger.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── cart.rs       ◄─── Till cart and saved storefront cart
//! ├── checkout.rs   ◄─── Till checkout: cash, non-cash, credit
//! ├── storefront.rs ◄─── Customer order + chat handoff
//! ├── orders.rs     ◄─── Order list, completion, cancel, delete
//! ├── credit.rs     ◄─── Credit tabs: charge, settle, delete
//! ├── cash.rs       ◄─── Cash book and monthly summary
//! ├── inventory.rs  ◄─── Products, stock adjustments, low stock
//! ├── catalog.rs    ◄─── Browsing, sections, categories, units
//! └── sequence.rs   ◄─── Step runner for multi-write commands
//! ```
//!
//! ## How Commands Work
//! A command is a plain function taking only the state it needs and
//! returning `Result<T, ApiError>`:
//!
//! ```rust,ignore
//! // Only needs database
//! async fn list_orders(db: &DbState) -> Result<Vec<Order>, ApiError>
//!
//! // Only needs the stock view and the till cart
//! fn pos_add_item(stock: &StockState, cart: &PosCartState, product_id: &str)
//!
//! // Destructive: asks first, returns Outcome::Declined when refused
//! async fn cancel_order(db: &DbState, confirm: &dyn Confirm, order_id: &str)
//! ```
//!
//! ## Multi-Write Commands
//! Checkout, order completion and tab settlement write several rows with no
//! transaction around them. They run through [`sequence`] so a failure
//! names the step that broke and the steps already kept.

pub mod cart;
pub mod cash;
pub mod catalog;
pub mod checkout;
pub mod credit;
pub mod inventory;
pub mod orders;
mod sequence;
pub mod storefront;
