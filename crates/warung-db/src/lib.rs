//! # warung-db: Data Store for Warung POS
//!
//! The shop's relational store: SQLite through sqlx, with embedded
//! migrations, one repository per collection and a realtime feed of
//! committed order inserts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Warung POS Data Flow                             │
//! │                                                                         │
//! │  Console command (checkout_cash, complete_order, ...)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ products       │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ orders + lines │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │    │ cash_entries   │    │              │  │   │
//! │  │   │ + feed        │    │ credit_tabs    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/warung.db                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("warung.db")).await?;
//! let products = db.products().list().await?;
//! let mut feed = db.subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use events::StoreEvent;
pub use pool::{Database, DbConfig};

pub use repository::cash::CashEntryRepository;
pub use repository::catalog::{CategoryRepository, UnitRepository};
pub use repository::credit::CreditTabRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::section::SectionRepository;
