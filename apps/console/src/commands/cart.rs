//! # Cart Commands
//!
//! Mutations of the till cart and the customer's storefront cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐                     │
//! │  │  Empty   │────►│ In Cart  │────►│  Checkout    │──── success ──┐     │
//! │  │  Cart    │     │          │     │ (checkout.rs │               │     │
//! │  └──────────┘     └──────────┘     │ storefront.rs)│              │     │
//! │       ▲                │           └──────────────┘               │     │
//! │       │           add / increase                                  │     │
//! │       │           decrease / remove                               │     │
//! │       │                │                                          │     │
//! │       └──── clear ─────┴──────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product ids that are not in the cart are no-ops for every mutation.

use serde::Serialize;
use tracing::debug;
use warung_core::{Cart, CartEntry, CartTotals, Product};

use crate::error::ApiError;
use crate::state::{PosCartState, StockState, StorefrontCartState};

/// Cart response including entries and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub entries: Vec<CartEntry>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            entries: cart.entries().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

fn known_product(stock: &StockState, product_id: &str) -> Result<Product, ApiError> {
    stock
        .product(product_id)
        .ok_or_else(|| ApiError::not_found("Product", product_id))
}

// =============================================================================
// POS cart
// =============================================================================

pub fn pos_cart(cart: &PosCartState) -> CartResponse {
    cart.with_cart(|c| CartResponse::from(c.as_cart()))
}

/// Adds one unit at the till.
///
/// ## Errors
/// `INSUFFICIENT_STOCK` once the cart holds every known unit; the cart is
/// left as it was.
pub fn pos_add_item(
    stock: &StockState,
    cart: &PosCartState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id, "pos_add_item command");
    let product = known_product(stock, product_id)?;

    stock.with_ledger(|ledger| cart.with_cart_mut(|c| c.add_item(&product, ledger)))?;
    Ok(pos_cart(cart))
}

/// Moves a till entry's quantity by `delta`; at 0 or below it is removed.
pub fn pos_change_quantity(
    stock: &StockState,
    cart: &PosCartState,
    product_id: &str,
    delta: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id, delta, "pos_change_quantity command");
    stock.with_ledger(|ledger| {
        cart.with_cart_mut(|c| c.set_quantity_delta(product_id, delta, ledger))
    })?;
    Ok(pos_cart(cart))
}

pub fn pos_remove_item(cart: &PosCartState, product_id: &str) -> CartResponse {
    cart.with_cart_mut(|c| c.remove_entry(product_id));
    pos_cart(cart)
}

pub fn pos_clear(cart: &PosCartState) -> CartResponse {
    cart.with_cart_mut(|c| c.clear());
    pos_cart(cart)
}

// =============================================================================
// Storefront cart
// =============================================================================

pub fn storefront_cart(cart: &StorefrontCartState) -> CartResponse {
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds `quantity` units. The storefront does not bound by stock: the
/// order only leaves through the merchant, who checks availability.
pub fn storefront_add_item(
    stock: &StockState,
    cart: &StorefrontCartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id, quantity, "storefront_add_item command");
    let product = known_product(stock, product_id)?;
    cart.with_cart_mut(|c| c.add_item(&product, quantity))??;
    Ok(storefront_cart(cart))
}

pub fn storefront_increase(
    cart: &StorefrontCartState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    cart.with_cart_mut(|c| c.increase(product_id))??;
    Ok(storefront_cart(cart))
}

/// Takes one unit off; the entry goes away at zero.
pub fn storefront_decrease(
    cart: &StorefrontCartState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    cart.with_cart_mut(|c| c.decrease(product_id))?;
    Ok(storefront_cart(cart))
}

pub fn storefront_remove_entry(
    cart: &StorefrontCartState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    cart.with_cart_mut(|c| c.remove_entry(product_id))?;
    Ok(storefront_cart(cart))
}

pub fn storefront_clear(cart: &StorefrontCartState) -> Result<CartResponse, ApiError> {
    cart.with_cart_mut(|c| c.clear())?;
    Ok(storefront_cart(cart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::DbState;
    use crate::test_support::{seed_product, stocked};

    #[tokio::test]
    async fn test_pos_add_stops_at_stock() {
        let db = DbState::in_memory().await.unwrap();
        let c = seed_product(&db, "Gula", 17500, 3).await;
        let stock = stocked(&db).await;
        let cart = PosCartState::new();

        for _ in 0..3 {
            pos_add_item(&stock, &cart, &c.id).unwrap();
        }
        let err = pos_add_item(&stock, &cart, &c.id).unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(pos_cart(&cart).totals.total_item_count, 3);
    }

    #[tokio::test]
    async fn test_pos_change_quantity() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Beras", 14000, 5).await;
        let stock = stocked(&db).await;
        let cart = PosCartState::new();

        pos_add_item(&stock, &cart, &p.id).unwrap();
        let resp = pos_change_quantity(&stock, &cart, &p.id, 3).unwrap();
        assert_eq!(resp.totals.total_item_count, 4);

        assert!(pos_change_quantity(&stock, &cart, &p.id, 2).is_err());
        assert_eq!(pos_cart(&cart).totals.total_item_count, 4);

        let resp = pos_change_quantity(&stock, &cart, &p.id, -4).unwrap();
        assert!(resp.entries.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = DbState::in_memory().await.unwrap();
        let stock = stocked(&db).await;
        let cart = PosCartState::new();

        let err = pos_add_item(&stock, &cart, "missing").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_storefront_cart_totals() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Teh Botol", 7000, 1).await;
        let b = seed_product(&db, "Minyak", 15000, 10).await;
        let stock = stocked(&db).await;

        let dir = tempfile::tempdir().unwrap();
        let cart = StorefrontCartState::load(dir.path().join("cart.json"));

        // No stock bound on the storefront
        storefront_add_item(&stock, &cart, &a.id, 2).unwrap();
        let resp = storefront_add_item(&stock, &cart, &b.id, 1).unwrap();
        assert_eq!(resp.totals.total_amount, 29000);
        assert_eq!(resp.totals.total_item_count, 3);

        storefront_decrease(&cart, &b.id).unwrap();
        let resp = storefront_decrease(&cart, "not-in-cart").unwrap();
        assert_eq!(resp.entries.len(), 1);
        assert_eq!(resp.entries[0].product_id, a.id);
    }

    #[tokio::test]
    async fn test_storefront_quantity_limit() {
        let db = DbState::in_memory().await.unwrap();
        let a = seed_product(&db, "Teh Botol", 7000, 1).await;
        let stock = stocked(&db).await;

        let dir = tempfile::tempdir().unwrap();
        let cart = StorefrontCartState::load(dir.path().join("cart.json"));

        storefront_add_item(&stock, &cart, &a.id, 999).unwrap();
        let err = storefront_add_item(&stock, &cart, &a.id, i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = storefront_increase(&cart, &a.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let resp = storefront_cart(&cart);
        assert_eq!(resp.totals.total_item_count, 999);
        assert_eq!(resp.totals.total_amount, 6_993_000);
    }
}
