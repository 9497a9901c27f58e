//! # Stock Ledger View
//!
//! The last fetched stock level per product, used to bound the POS cart.
//!
//! ## Consistency Model
//! ```text
//!   store ──(full re-fetch)──► StockLedger ──► PosCart bound checks
//!     ▲                                             │
//!     └─────────── checkout / adjust / complete ◄───┘
//! ```
//! The view is replaced wholesale after every mutating sequence, never
//! patched. Between refreshes it may be stale: two terminals can both pass
//! the check and together oversell. Stock decrements in the store are
//! floored at 0, so the drift never goes negative.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::Product;

/// In-memory read model of stock levels.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    levels: HashMap<String, i64>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a freshly fetched product list.
    pub fn from_products(products: &[Product]) -> Self {
        let mut ledger = Self::new();
        ledger.refresh(products);
        ledger
    }

    /// Replaces every known level with `products`.
    ///
    /// Products missing from the list are forgotten (deleted upstream).
    pub fn refresh(&mut self, products: &[Product]) {
        self.levels = products
            .iter()
            .map(|p| (p.id.clone(), p.stock.max(0)))
            .collect();
        self.refreshed_at = Some(Utc::now());
    }

    /// Last known stock for a product. Unknown products report 0.
    pub fn available_stock(&self, product_id: &str) -> i64 {
        self.levels.get(product_id).copied().unwrap_or(0)
    }

    /// When the view was last replaced, `None` before the first fetch.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
