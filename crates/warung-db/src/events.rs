//! # Realtime Change Feed
//!
//! Committed inserts are announced on a `tokio::sync::broadcast` channel.
//!
//! ```text
//!  OrderRepository::insert ──commit──► Sender<StoreEvent>
//!                                          │
//!                    ┌─────────────────────┼──────────────────┐
//!                    ▼                     ▼                  ▼
//!              console watcher        (other listeners)   tests
//!              re-fetch + alert
//! ```
//!
//! Listeners use it to refresh, never as a source of truth. A lagging
//! receiver drops old events and should simply re-fetch.

use tokio::sync::broadcast;
use warung_core::Order;

/// Events buffered per receiver before old ones are dropped.
pub const FEED_CAPACITY: usize = 64;

/// A change committed to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A new order row (storefront or POS).
    OrderInserted(Order),
}

pub(crate) fn channel() -> broadcast::Sender<StoreEvent> {
    let (sender, _) = broadcast::channel(FEED_CAPACITY);
    sender
}
