//! # Cart State
//!
//! The two carts of the application.
//!
//! ## Lifetimes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Storage                                         │
//! │                                                                         │
//! │  StorefrontCartState          PosCartState                              │
//! │  ───────────────────          ────────────                              │
//! │  customer session             till session                              │
//! │  saved to cart.json on        memory only; gone on restart,             │
//! │  EVERY mutation, reloaded     cleared after a successful checkout       │
//! │  at startup                                                             │
//! │                                                                         │
//! │  no stock bound               bounded by StockState                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both use a `std::sync::Mutex`: every critical section is short and
//! never held across an `.await`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use warung_core::{Cart, PosCart};

use crate::error::ApiError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic elsewhere cannot leave a cart half-updated: every mutation
    // is a single method call on the inner value.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// POS Cart
// =============================================================================

/// The till's cart, session-scoped.
#[derive(Debug, Default, Clone)]
pub struct PosCartState {
    cart: Arc<Mutex<PosCart>>,
}

impl PosCartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PosCart) -> R,
    {
        f(&lock(&self.cart))
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PosCart) -> R,
    {
        f(&mut lock(&self.cart))
    }
}

// =============================================================================
// Storefront Cart
// =============================================================================

/// The customer's cart, written through to a JSON file.
#[derive(Debug, Clone)]
pub struct StorefrontCartState {
    cart: Arc<Mutex<Cart>>,
    path: PathBuf,
}

impl StorefrontCartState {
    /// Loads the saved cart at `path`.
    ///
    /// A missing file is an empty cart. Saved entries are normalised the
    /// way [`Cart`] deserialization does (empty entries dropped, repeats
    /// merged). An unreadable file, or one over the per-item limit, is
    /// logged and replaced by an empty cart on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cart = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<Cart>(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Saved cart unreadable, starting empty");
                Cart::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Cart::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read saved cart, starting empty");
                Cart::new()
            }
        };

        debug!(path = %path.display(), entries = cart.len(), "Storefront cart loaded");
        StorefrontCartState {
            cart: Arc::new(Mutex::new(cart)),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&lock(&self.cart))
    }

    /// Executes a mutation, then saves the whole cart.
    ///
    /// The in-memory change stands even if the save fails; the error tells
    /// the caller the cart will not survive a restart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = lock(&self.cart);
        let result = f(&mut cart);
        self.save(&cart)?;
        Ok(result)
    }

    fn save(&self, cart: &Cart) -> Result<(), ApiError> {
        let json = serde_json::to_string(cart)
            .map_err(|e| ApiError::internal(format!("Cannot encode cart: {}", e)))?;

        // Write then rename so a crash never leaves half a file behind
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ApiError::storage(format!("Cannot save cart to {}: {}", self.path.display(), e))
            })
    }
}
