//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! The `SqlitePool` inside is thread-safe, so commands can run queries
//! concurrently without extra locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_orders(db: &DbState) -> Result<Vec<Order>, ApiError> {
//!     Ok(db.inner().orders().list().await?)
//! }
//! ```

use tokio::sync::broadcast;
use warung_db::{Database, DbConfig, StoreEvent};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Fresh in-memory store with migrations applied.
    pub async fn in_memory() -> Result<Self, ApiError> {
        Ok(DbState::new(Database::new(DbConfig::in_memory()).await?))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// New receiver on the store's change feed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.db.subscribe()
    }
}
