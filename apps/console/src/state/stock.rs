//! # Stock State
//!
//! Last fetched product list and the stock levels derived from it.
//!
//! Refreshed by a full re-fetch after every sequence that can move stock
//! (checkout, order completion, manual adjustment). Never patched in place,
//! so it can lag behind the store between refreshes; another till can
//! sell the same units meanwhile and nothing here will notice.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use warung_core::{Product, StockLedger};
use warung_db::{Database, DbResult};

#[derive(Debug, Default)]
struct Snapshot {
    products: Vec<Product>,
    ledger: StockLedger,
}

#[derive(Debug, Default, Clone)]
pub struct StockState {
    snapshot: Arc<Mutex<Snapshot>>,
}

impl StockState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-fetches every product and replaces the view.
    ///
    /// Returns the number of products now known.
    pub async fn refresh(&self, db: &Database) -> DbResult<usize> {
        let products = db.products().list().await?;
        let count = products.len();

        let mut snapshot = self.lock();
        snapshot.ledger.refresh(&products);
        snapshot.products = products;

        debug!(products = count, "Stock view refreshed");
        Ok(count)
    }

    /// Last known stock for a product, 0 if unknown.
    pub fn available(&self, product_id: &str) -> i64 {
        self.lock().ledger.available_stock(product_id)
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.lock().products.iter().find(|p| p.id == product_id).cloned()
    }

    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// Runs `f` against the current ledger without copying it.
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StockLedger) -> R,
    {
        f(&self.lock().ledger)
    }
}
