//! # Order Line Cache
//!
//! Lines of orders the operator has expanded, loaded on first use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use warung_core::OrderLine;

#[derive(Debug, Default, Clone)]
pub struct OrderLineCache {
    lines: Arc<Mutex<HashMap<String, Vec<OrderLine>>>>,
}

impl OrderLineCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<OrderLine>>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, order_id: &str) -> Option<Vec<OrderLine>> {
        self.lock().get(order_id).cloned()
    }

    pub fn insert(&self, order_id: &str, lines: Vec<OrderLine>) {
        self.lock().insert(order_id.to_string(), lines);
    }

    /// Drops an order's lines (order deleted).
    pub fn invalidate(&self, order_id: &str) {
        self.lock().remove(order_id);
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.lock().contains_key(order_id)
    }
}
