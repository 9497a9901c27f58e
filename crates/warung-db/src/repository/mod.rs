//! # Repository Module
//!
//! One repository per collection in the shop database.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  db.orders().insert(&plan.order)                               │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert / insert_lines                                             │
//! │  ├── get_by_id / list / recent / lines                                 │
//! │  └── update_status / delete                                            │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked queries, FromRow)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products, floored stock updates, bulk delete
//! - [`catalog::CategoryRepository`] / [`catalog::UnitRepository`] - Reference lists
//! - [`order::OrderRepository`] - Orders and lines, publishes inserts
//! - [`cash::CashEntryRepository`] - Append-only cash book
//! - [`credit::CreditTabRepository`] - Tabs and their charge log
//! - [`section::SectionRepository`] - Storefront sections

pub mod cash;
pub mod catalog;
pub mod credit;
pub mod order;
pub mod product;
pub mod section;
