//! # Storefront Checkout
//!
//! A customer's cart becomes a **Pending** order plus its lines. Nothing
//! else is written: no cash entry and no stock reservation. Stock leaves
//! the shelf when the operator completes the order.
//!
//! ```text
//! customer cart ──► StorefrontOrderRequest::new ──► plan()
//!                        (validates)                  │
//!                                                     ├─ Order (Pending)
//!                                                     └─ OrderLines
//! ```

use chrono::Utc;
use uuid::Uuid;

use crate::cart::Cart;
use crate::checkout::order_lines;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{FulfillmentKind, Order, OrderLine, OrderStatus, PaymentMethod};
use crate::validation::{validate_note, validate_required};

/// A validated storefront order.
#[derive(Debug, Clone)]
pub struct StorefrontOrderRequest {
    cart: Cart,
    buyer_name: String,
    note: Option<String>,
    fulfillment: FulfillmentKind,
    delivery_address: Option<String>,
    payment_method: PaymentMethod,
}

impl StorefrontOrderRequest {
    /// ## Errors
    /// - `EmptyCart`
    /// - buyer name blank
    /// - delivery without an address
    /// - payment other than cash or non-cash (credit is till-only)
    pub fn new(
        cart: &Cart,
        buyer_name: &str,
        note: Option<&str>,
        fulfillment: FulfillmentKind,
        delivery_address: Option<&str>,
        payment_method: PaymentMethod,
    ) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let buyer_name = validate_required("buyer name", buyer_name)?;
        let note = validate_note("note", note)?;

        let delivery_address = match fulfillment {
            FulfillmentKind::Pickup => None,
            FulfillmentKind::Delivery => {
                Some(validate_required("delivery address", delivery_address.unwrap_or(""))?)
            }
        };

        if !matches!(payment_method, PaymentMethod::Cash | PaymentMethod::NonCash) {
            return Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".to_string(), "non_cash".to_string()],
            }
            .into());
        }

        Ok(StorefrontOrderRequest {
            cart: cart.clone(),
            buyer_name,
            note,
            fulfillment,
            delivery_address,
            payment_method,
        })
    }

    pub fn plan(&self) -> StorefrontOrderPlan {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            buyer_name: self.buyer_name.clone(),
            note: self.note.clone(),
            total_amount: self.cart.total_amount().amount(),
            status: OrderStatus::Pending,
            payment_method: self.payment_method,
            fulfillment: self.fulfillment,
            delivery_address: self.delivery_address.clone(),
            created_at: Utc::now(),
        };
        let lines = order_lines(&order.id, self.cart.entries());

        StorefrontOrderPlan { order, lines }
    }
}

/// The two writes of a storefront order: header then lines.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontOrderPlan {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}
