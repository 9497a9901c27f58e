//! # Warung Console Library
//!
//! The admin console and storefront session of Warung POS: managed state,
//! command functions and the new-order watcher. The `warung-console`
//! binary is a thin runner around it.
//!
//! ## Module Organization
//! ```text
//! warung_console/
//! ├── lib.rs          ◄─── You are here (App bundle, tracing setup)
//! ├── config.rs       ◄─── console.toml + WARUNG_* env
//! ├── error.rs        ◄─── ApiError, session-expiry classification
//! ├── prompt.rs       ◄─── Confirm collaborator, Outcome
//! ├── watcher.rs      ◄─── Realtime new-order alerts
//! ├── state/
//! │   ├── db.rs       ◄─── Database handle
//! │   ├── cart.rs     ◄─── Till cart, persisted storefront cart
//! │   ├── stock.rs    ◄─── Product list + stock ledger view
//! │   └── orders.rs   ◄─── Lazily loaded order lines
//! └── commands/       ◄─── Checkout, orders, credit, cash, inventory, catalog
//! ```
//!
//! ## State Management
//! There is no single `AppState`: every command takes only the state types
//! it needs. [`App`] just owns one of each for the binary.

pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod state;
pub mod watcher;

#[cfg(test)]
mod test_support;

use tracing::info;
use tracing_subscriber::EnvFilter;
use warung_db::{Database, DbConfig};

use config::ConsoleConfig;
use error::ApiError;
use state::{DbState, OrderLineCache, PosCartState, StockState, StorefrontCartState};

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,warung=debug,sqlx=warn";

/// One of each state type, opened from a [`ConsoleConfig`].
#[derive(Debug, Clone)]
pub struct App {
    pub config: ConsoleConfig,
    pub db: DbState,
    pub pos_cart: PosCartState,
    pub storefront_cart: StorefrontCartState,
    pub stock: StockState,
    pub order_lines: OrderLineCache,
}

impl App {
    /// Connects to the database (running migrations), loads the saved
    /// storefront cart and fills the stock view.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. Database::new(database_path)  ── WAL, foreign keys, migrations
    /// 2. StorefrontCartState::load     ── cart.json, empty if absent
    /// 3. StockState::refresh           ── products + stock ledger
    /// ```
    pub async fn open(config: ConsoleConfig) -> Result<Self, ApiError> {
        info!(path = %config.database_path.display(), "Opening database");
        let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
        Self::with_database(config, db).await
    }

    /// Same as [`App::open`] over an already connected database.
    pub async fn with_database(config: ConsoleConfig, db: Database) -> Result<Self, ApiError> {
        let db = DbState::new(db);
        let storefront_cart = StorefrontCartState::load(config.cart_path.clone());
        let stock = StockState::new();
        let products = stock.refresh(db.inner()).await?;

        info!(products, store = %config.store_name, "Console state initialized");
        Ok(App {
            config,
            db,
            pos_cart: PosCartState::new(),
            storefront_cart,
            stock,
            order_lines: OrderLineCache::new(),
        })
    }

    pub async fn close(&self) {
        self.db.inner().close().await;
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=warung_db=trace` - Trace for the store only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
