//! # Cart Engine
//!
//! One cart shape, two instances:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart (storefront)                 PosCart (admin till)                 │
//! │  ──────────────────                ─────────────────────                │
//! │  no stock bound                    bounded by StockLedger               │
//! │  persisted on every mutation       session only, never persisted        │
//! │  checkout → Pending order          checkout → Completed order           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one entry per product id, kept in insertion order
//! - Every entry has quantity ≥ 1 (dropping to 0 removes the entry)
//! - No entry holds more than [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY) units
//! - `PosCart` never holds more of a product than the ledger last reported
//!
//! Mutations on ids that are not in the cart are silent no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::StockLedger;
use crate::types::Product;
use crate::validation::validate_quantity;

// =============================================================================
// Cart Entry
// =============================================================================

/// A product snapshot plus quantity.
///
/// Name, unit and price are frozen when the product is first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartEntry {
    pub product_id: String,
    pub name: String,
    pub unit: String,
    pub unit_price: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartEntry {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartEntry {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            unit_price: product.price,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_amount(self.unit_price).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The generic cart. Serializable so the storefront can persist it.
///
/// Deserializing goes through [`Cart::from_entries`], so a saved cart
/// comes back with the same invariants as one built by mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Saved {
            entries: Vec<CartEntry>,
        }

        let saved = Saved::deserialize(deserializer)?;
        Cart::from_entries(saved.entries).map_err(serde::de::Error::custom)
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from stored entries.
    ///
    /// Entries with quantity ≤ 0 are dropped and repeated product ids are
    /// merged into the first one. Fails when a merged quantity is over the
    /// per-item limit.
    pub fn from_entries(entries: Vec<CartEntry>) -> CoreResult<Self> {
        let mut cart = Cart::new();
        for entry in entries {
            if entry.quantity <= 0 {
                continue;
            }
            match cart.entry_mut(&entry.product_id) {
                Some(existing) => {
                    let merged = existing.quantity.saturating_add(entry.quantity);
                    validate_quantity(merged)?;
                    existing.quantity = merged;
                }
                None => {
                    validate_quantity(entry.quantity)?;
                    cart.entries.push(entry);
                }
            }
        }
        Ok(cart)
    }

    /// Adds `quantity` of a product, merging with an existing entry.
    ///
    /// Non-positive quantities are ignored. A merged quantity above
    /// [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY) is rejected and the cart is left unchanged.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Ok(());
        }

        let merged = self.quantity_of(&product.id).saturating_add(quantity);
        validate_quantity(merged)?;

        match self.entry_mut(&product.id) {
            Some(entry) => entry.quantity = merged,
            None => self.entries.push(CartEntry::from_product(product, quantity)),
        }
        Ok(())
    }

    /// Takes one unit away. Same as [`Cart::decrease`].
    pub fn remove_one(&mut self, product_id: &str) {
        self.decrease(product_id);
    }

    /// Adds one unit to an entry, up to [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY).
    pub fn increase(&mut self, product_id: &str) -> CoreResult<()> {
        if let Some(entry) = self.entry_mut(product_id) {
            let next = entry.quantity.saturating_add(1);
            validate_quantity(next)?;
            entry.quantity = next;
        }
        Ok(())
    }

    /// Takes one unit away, removing the entry when it would reach 0.
    pub fn decrease(&mut self, product_id: &str) {
        self.apply_delta(product_id, -1);
    }

    /// Takes `quantity` units away, removing the entry at 0. Used to retire
    /// what an order took while keeping anything added since.
    pub fn take(&mut self, product_id: &str, quantity: i64) {
        if quantity > 0 {
            self.apply_delta(product_id, -quantity);
        }
    }

    /// Drops the whole entry for a product.
    pub fn remove_entry(&mut self, product_id: &str) {
        self.entries.retain(|e| e.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of unit price × quantity over all entries.
    pub fn total_amount(&self) -> Money {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities.
    pub fn total_item_count(&self) -> i64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Read-only snapshot of the entries, in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Quantity held for a product, 0 when absent.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.entries
            .iter()
            .find(|e| e.product_id == product_id)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.entries.iter().any(|e| e.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_mut(&mut self, product_id: &str) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.product_id == product_id)
    }

    /// Adds `delta` to an entry; removes it when the result is ≤ 0.
    fn apply_delta(&mut self, product_id: &str, delta: i64) {
        let Some(entry) = self.entry_mut(product_id) else {
            return;
        };

        let next = entry.quantity.saturating_add(delta);
        if next <= 0 {
            self.remove_entry(product_id);
        } else {
            entry.quantity = next;
        }
    }
}

// =============================================================================
// POS Cart
// =============================================================================

/// The till's cart. Every increase is checked against the stock ledger.
///
/// ## User Workflow
/// ```text
/// tap product ──► add_item(product, &ledger)
///                    │
///                    ├── in cart + 1 > available ──► Err(InsufficientStock), unchanged
///                    │
///                    └── otherwise ──────────────► quantity + 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosCart {
    cart: Cart,
}

impl PosCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit, rejected if it would exceed known stock.
    pub fn add_item(&mut self, product: &Product, ledger: &StockLedger) -> CoreResult<()> {
        let requested = self.cart.quantity_of(&product.id) + 1;
        let available = ledger.available_stock(&product.id);

        if requested > available {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available,
                requested,
            });
        }

        self.cart.add_item(product, 1)
    }

    /// Changes an entry's quantity by `delta`.
    ///
    /// - result ≤ 0: the entry is removed
    /// - result above available stock: rejected, entry unchanged
    /// - product not in cart: no-op
    pub fn set_quantity_delta(
        &mut self,
        product_id: &str,
        delta: i64,
        ledger: &StockLedger,
    ) -> CoreResult<()> {
        let Some(entry) = self.cart.entries().iter().find(|e| e.product_id == product_id) else {
            return Ok(());
        };

        let requested = entry.quantity.saturating_add(delta);
        let available = ledger.available_stock(product_id);
        if requested > 0 && requested > available {
            return Err(CoreError::InsufficientStock {
                product: entry.name.clone(),
                available,
                requested,
            });
        }

        self.cart.apply_delta(product_id, delta);
        Ok(())
    }

    pub fn remove_entry(&mut self, product_id: &str) {
        self.cart.remove_entry(product_id);
    }

    pub fn clear(&mut self) {
        self.cart.clear();
    }

    pub fn total_amount(&self) -> Money {
        self.cart.total_amount()
    }

    pub fn total_item_count(&self) -> i64 {
        self.cart.total_item_count()
    }

    pub fn entries(&self) -> &[CartEntry] {
        self.cart.entries()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// The underlying cart, for checkout planning.
    pub fn as_cart(&self) -> &Cart {
        &self.cart
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_item_count: i64,
    pub total_amount: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.len(),
            total_item_count: cart.total_item_count(),
            total_amount: cart.total_amount().amount(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id.to_uppercase()),
            category: "Sembako".to_string(),
            unit: "pcs".to_string(),
            price,
            stock,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_totals() {
        let a = product("a", 7000, 10);
        let b = product("b", 15000, 10);
        let mut cart = Cart::new();

        cart.add_item(&a, 2).unwrap();
        cart.add_item(&b, 1).unwrap();

        assert_eq!(cart.total_amount().amount(), 29000);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_merges_and_keeps_order() {
        let a = product("a", 7000, 10);
        let b = product("b", 15000, 10);
        let mut cart = Cart::new();

        cart.add_item(&a, 1).unwrap();
        cart.add_item(&b, 1).unwrap();
        cart.add_item(&a, 1).unwrap();

        let ids: Vec<_> = cart.entries().iter().map(|e| e.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cart.quantity_of("a"), 2);
    }

    #[test]
    fn test_totals_hold_over_mixed_mutations() {
        let a = product("a", 2500, 10);
        let b = product("b", 4000, 10);
        let mut cart = Cart::new();

        cart.add_item(&a, 3).unwrap();
        cart.increase("a").unwrap();
        cart.add_item(&b, 1).unwrap();
        cart.decrease("b");
        cart.decrease("a");
        cart.increase("missing").unwrap();

        let expected: i64 = cart.entries().iter().map(|e| e.unit_price * e.quantity).sum();
        assert_eq!(cart.total_amount().amount(), expected);
        assert_eq!(cart.total_item_count(), 3);
        assert!(cart.entries().iter().all(|e| e.quantity > 0));
        assert!(!cart.contains("b"));
    }

    #[test]
    fn test_decrease_to_zero_removes_entry() {
        let a = product("a", 7000, 10);
        let mut cart = Cart::new();

        cart.add_item(&a, 1).unwrap();
        cart.decrease("a");
        assert!(!cart.contains("a"));

        cart.add_item(&a, 1).unwrap();
        cart.remove_one("a");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_take_keeps_later_additions() {
        let a = product("a", 1000, 10);
        let b = product("b", 2000, 10);
        let mut cart = Cart::new();
        cart.add_item(&a, 2).unwrap();
        cart.add_item(&b, 1).unwrap();
        cart.add_item(&a, 3).unwrap();

        cart.take("a", 2);
        cart.take("b", 1);
        cart.take("missing", 4);

        assert_eq!(cart.quantity_of("a"), 3);
        assert!(!cart.contains("b"));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut cart = Cart::new();
        cart.increase("x").unwrap();
        cart.decrease("x");
        cart.remove_one("x");
        cart.remove_entry("x");
        assert!(cart.is_empty());

        cart.add_item(&product("a", 1000, 1), 0).unwrap();
        cart.add_item(&product("a", 1000, 1), -5).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_capped_per_item() {
        let a = product("a", 7000, 10);
        let mut cart = Cart::new();

        cart.add_item(&a, 998).unwrap();
        cart.increase("a").unwrap();
        assert_eq!(cart.quantity_of("a"), 999);

        assert!(matches!(cart.increase("a"), Err(CoreError::Validation(_))));
        assert!(matches!(cart.add_item(&a, 1), Err(CoreError::Validation(_))));
        assert!(cart.add_item(&a, i64::MAX).is_err());
        assert_eq!(cart.quantity_of("a"), 999);

        let mut fresh = Cart::new();
        assert!(fresh.add_item(&a, 1000).is_err());
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_saved_cart_is_normalised() {
        let json = r#"{"entries":[
            {"product_id":"a","name":"A","unit":"pcs","unit_price":1000,"quantity":2,"added_at":"2024-01-01T00:00:00Z"},
            {"product_id":"b","name":"B","unit":"pcs","unit_price":500,"quantity":0,"added_at":"2024-01-01T00:00:00Z"},
            {"product_id":"a","name":"A","unit":"pcs","unit_price":1000,"quantity":3,"added_at":"2024-01-01T00:00:00Z"},
            {"product_id":"c","name":"C","unit":"pcs","unit_price":500,"quantity":-4,"added_at":"2024-01-01T00:00:00Z"}
        ]}"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("a"), 5);
        assert_eq!(cart.total_amount().amount(), 5000);
    }

    #[test]
    fn test_saved_cart_over_limit_rejected() {
        let json = r#"{"entries":[
            {"product_id":"a","name":"A","unit":"pcs","unit_price":1000,"quantity":9223372036854775807,"added_at":"2024-01-01T00:00:00Z"}
        ]}"#;

        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_cart_serde_roundtrip_for_persistence() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 7000, 10), 2).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_pos_cart_bound_by_stock() {
        let c = product("c", 5000, 3);
        let ledger = StockLedger::from_products(&[c.clone()]);
        let mut pos = PosCart::new();

        for _ in 0..3 {
            pos.add_item(&c, &ledger).unwrap();
        }
        for _ in 0..5 {
            let err = pos.add_item(&c, &ledger).unwrap_err();
            assert!(matches!(err, CoreError::InsufficientStock { available: 3, .. }));
        }

        assert_eq!(pos.as_cart().quantity_of("c"), 3);
    }

    #[test]
    fn test_pos_cart_rejects_sold_out() {
        let p = product("p", 5000, 0);
        let ledger = StockLedger::from_products(&[p.clone()]);
        let mut pos = PosCart::new();

        assert!(pos.add_item(&p, &ledger).is_err());
        assert!(pos.is_empty());
    }

    #[test]
    fn test_pos_set_quantity_delta() {
        let p = product("p", 1000, 4);
        let ledger = StockLedger::from_products(&[p.clone()]);
        let mut pos = PosCart::new();
        pos.add_item(&p, &ledger).unwrap();

        pos.set_quantity_delta("p", 3, &ledger).unwrap();
        assert_eq!(pos.as_cart().quantity_of("p"), 4);

        // Above stock: rejected, unchanged
        assert!(pos.set_quantity_delta("p", 1, &ledger).is_err());
        assert_eq!(pos.as_cart().quantity_of("p"), 4);

        // To zero or below: removed
        pos.set_quantity_delta("p", -10, &ledger).unwrap();
        assert!(pos.is_empty());

        // Not in cart: no-op
        pos.set_quantity_delta("p", 1, &ledger).unwrap();
        assert!(pos.is_empty());
    }

    #[test]
    fn test_cart_totals_summary() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 7000, 10), 2).unwrap();
        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.total_item_count, 2);
        assert_eq!(totals.total_amount, 14000);
    }
}
