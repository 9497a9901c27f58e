//! # State Module
//!
//! Application state for the console, one focused type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌────────────────────┐              │
//! │  │   DbState    │ │ PosCartState │ │ StorefrontCartState│              │
//! │  │  Database    │ │  till cart   │ │  customer cart     │              │
//! │  │  + feed      │ │  (memory)    │ │  (cart.json)       │              │
//! │  └──────────────┘ └──────────────┘ └────────────────────┘              │
//! │  ┌──────────────┐ ┌──────────────┐                                     │
//! │  │  StockState  │ │OrderLineCache│                                     │
//! │  │  products +  │ │  lazily      │                                     │
//! │  │  stock view  │ │  loaded lines│                                     │
//! │  └──────────────┘ └──────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs.

mod cart;
mod db;
mod orders;
mod stock;

pub use cart::{PosCartState, StorefrontCartState};
pub use db::DbState;
pub use orders::OrderLineCache;
pub use stock::StockState;
