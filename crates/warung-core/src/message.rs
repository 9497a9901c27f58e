//! # Messaging Handoff
//!
//! Formats a placed storefront order as a pre-filled chat message to the
//! merchant. The order row is the durable record; this message is a
//! convenience and nobody waits for it to be delivered.
//!
//! ```text
//! Hello Warung Bu Sri, I'd like to order:
//! Order #1A2B3C4D
//! Name: Rina
//!
//! - 2x Minyak Goreng 1L (Rp 36.000)
//!
//! Total: Rp 36.000
//! Fulfillment: Delivery - Jl. Mawar 3
//! Payment: Cash
//! Note: leave at the gate
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::Url;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{FulfillmentKind, Order, OrderLine};
use crate::validation::validate_phone;

/// Base of the click-to-chat link.
pub const CHAT_LINK_BASE: &str = "https://wa.me/";

/// A message ready to hand to the messaging app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutboundMessage {
    /// Merchant phone, digits only.
    pub recipient: String,
    pub body: String,
    /// `https://wa.me/<recipient>?text=<body>`
    pub link: String,
}

impl OutboundMessage {
    /// Builds the order summary message for the merchant contact.
    pub fn order_summary(
        store_name: &str,
        merchant_phone: &str,
        order: &Order,
        lines: &[OrderLine],
    ) -> CoreResult<Self> {
        let recipient = validate_phone(merchant_phone)?;
        let body = order_summary_body(store_name, order, lines);

        let link = Url::parse_with_params(
            &format!("{}{}", CHAT_LINK_BASE, recipient),
            &[("text", body.as_str())],
        )
        .map_err(|e| ValidationError::InvalidFormat {
            field: "chat link".to_string(),
            reason: e.to_string(),
        })?;

        Ok(OutboundMessage {
            recipient,
            body,
            link: link.into(),
        })
    }
}

/// The message text, one item per line with its subtotal.
pub fn order_summary_body(store_name: &str, order: &Order, lines: &[OrderLine]) -> String {
    let items = lines
        .iter()
        .map(|l| format!("- {}x {} ({})", l.quantity, l.product_name, l.line_total()))
        .collect::<Vec<_>>()
        .join("\n");

    let fulfillment = match (order.fulfillment, order.delivery_address.as_deref()) {
        (FulfillmentKind::Delivery, Some(address)) => format!("Delivery - {}", address),
        (kind, _) => kind.label().to_string(),
    };

    let mut body = format!(
        "Hello {}, I'd like to order:\nOrder #{}\nName: {}\n\n{}\n\nTotal: {}\nFulfillment: {}\nPayment: {}",
        store_name,
        order.short_id(),
        order.buyer_name,
        items,
        Money::from_amount(order.total_amount),
        fulfillment,
        order.payment_method.label(),
    );

    if let Some(note) = order.note.as_deref() {
        body.push_str("\nNote: ");
        body.push_str(note);
    }

    body
}
