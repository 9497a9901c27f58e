//! # Storefront Order Command
//!
//! Turns the customer's saved cart into a Pending order and hands back the
//! chat message for the merchant. The message is built before anything is
//! written, so a bad merchant phone never leaves an orphan order.
//!
//! ```text
//! saved cart ─► StorefrontOrderRequest ─► plan ─► OutboundMessage
//!                                                   │
//!                  CreateOrder ─► CreateLines ┘─► take ordered items off the cart
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use warung_core::message::OutboundMessage;
use warung_core::storefront::StorefrontOrderRequest;
use warung_core::{FulfillmentKind, PaymentMethod, WriteStep};

use super::sequence::Sequence;
use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::state::{DbState, StorefrontCartState};

/// What the customer fills in at checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontOrderForm {
    pub buyer_name: String,
    pub note: Option<String>,
    pub fulfillment: FulfillmentKind,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontOrderResponse {
    pub order_id: String,
    pub short_id: String,
    pub message: OutboundMessage,
}

/// Places the storefront cart as a Pending order. No stock is taken and no
/// cash is posted until the operator completes it.
pub async fn place_storefront_order(
    db: &DbState,
    cart: &StorefrontCartState,
    config: &ConsoleConfig,
    form: &StorefrontOrderForm,
) -> Result<StorefrontOrderResponse, ApiError> {
    debug!(buyer = %form.buyer_name, fulfillment = ?form.fulfillment, "place_storefront_order command");

    let request = cart.with_cart(|c| {
        StorefrontOrderRequest::new(
            c,
            &form.buyer_name,
            form.note.as_deref(),
            form.fulfillment,
            form.delivery_address.as_deref(),
            form.payment_method,
        )
    })?;
    let plan = request.plan();
    let message = OutboundMessage::order_summary(
        &config.store_name,
        &config.merchant_phone,
        &plan.order,
        &plan.lines,
    )?;

    let orders = db.inner().orders();
    let mut seq = Sequence::new("storefront_order", Some(plan.order.id.as_str()));
    seq.run(WriteStep::CreateOrder, orders.insert(&plan.order))
        .await?;
    seq.run(WriteStep::CreateLines, orders.insert_lines(&plan.lines))
        .await?;

    // Only what the order took leaves the cart; items added while the order
    // was written stay. The order stands even if the cart cannot be saved.
    let taken = cart.with_cart_mut(|c| {
        for line in &plan.lines {
            c.take(&line.product_id, line.quantity);
        }
    });
    if let Err(e) = taken {
        warn!(order_id = %plan.order.id, error = %e, "Order placed but saved cart not cleared");
    }

    info!(
        order_id = %plan.order.id,
        total = plan.order.total_amount,
        lines = plan.lines.len(),
        "Storefront order placed"
    );

    Ok(StorefrontOrderResponse {
        short_id: plan.order.short_id(),
        order_id: plan.order.id,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{fail_on, seed_product, stock_of};
    use tempfile::TempDir;
    use warung_core::{OrderStatus, Product};
    use warung_db::StoreEvent;

    fn form(fulfillment: FulfillmentKind, address: Option<&str>, payment: PaymentMethod) -> StorefrontOrderForm {
        StorefrontOrderForm {
            buyer_name: "Sari".to_string(),
            note: Some("tanpa sambal".to_string()),
            fulfillment,
            delivery_address: address.map(str::to_string),
            payment_method: payment,
        }
    }

    fn filled_cart(dir: &TempDir, product: &Product, quantity: i64) -> StorefrontCartState {
        let cart = StorefrontCartState::load(dir.path().join("cart.json"));
        cart.with_cart_mut(|c| c.add_item(product, quantity)).unwrap().unwrap();
        cart
    }

    #[tokio::test]
    async fn test_order_is_pending_and_announced() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Kopi Kapal Api", 1500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 4);
        let mut feed = db.subscribe();

        let resp = place_storefront_order(
            &db,
            &cart,
            &ConsoleConfig::default(),
            &form(FulfillmentKind::Pickup, None, PaymentMethod::Cash),
        )
        .await
        .unwrap();

        let order = db.inner().orders().get_by_id(&resp.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 6000);
        assert_eq!(db.inner().orders().lines(&resp.order_id).await.unwrap().len(), 1);

        // Stock and cash untouched until completion
        assert_eq!(stock_of(&db, &p.id).await, 10);
        assert!(db.inner().cash_entries().list().await.unwrap().is_empty());

        match feed.recv().await.unwrap() {
            StoreEvent::OrderInserted(o) => assert_eq!(o.id, resp.order_id),
        }

        assert!(resp.message.link.starts_with("https://wa.me/6281200000000?text="));
        assert!(resp.message.body.contains("Kopi Kapal Api"));
        assert!(cart.with_cart(|c| c.is_empty()));
        let reloaded = StorefrontCartState::load(dir.path().join("cart.json"));
        assert!(reloaded.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_delivery_needs_address() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Gula", 17500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 1);

        let err = place_storefront_order(
            &db,
            &cart,
            &ConsoleConfig::default(),
            &form(FulfillmentKind::Delivery, Some("  "), PaymentMethod::NonCash),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(db.inner().orders().list().await.unwrap().is_empty());
        assert!(!cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_credit_and_empty_cart_rejected() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Gula", 17500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 1);
        let config = ConsoleConfig::default();

        let err = place_storefront_order(
            &db,
            &cart,
            &config,
            &form(FulfillmentKind::Pickup, None, PaymentMethod::Credit),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let empty = StorefrontCartState::load(dir.path().join("other.json"));
        let err = place_storefront_order(
            &db,
            &empty,
            &config,
            &form(FulfillmentKind::Pickup, None, PaymentMethod::Cash),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_bad_merchant_phone_writes_nothing() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Gula", 17500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 1);
        let config = ConsoleConfig {
            merchant_phone: "call me".to_string(),
            ..ConsoleConfig::default()
        };

        let err = place_storefront_order(
            &db,
            &cart,
            &config,
            &form(FulfillmentKind::Pickup, None, PaymentMethod::Cash),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(db.inner().orders().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_line_failure_keeps_order_and_cart() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Gula", 17500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 2);
        fail_on(&db, "order_lines", "INSERT", "lines locked").await;

        let err = place_storefront_order(
            &db,
            &cart,
            &ConsoleConfig::default(),
            &form(FulfillmentKind::Pickup, None, PaymentMethod::Cash),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::PartialWrite);
        assert_eq!(err.step, Some(WriteStep::CreateLines));
        assert!(err.message.contains("lines locked"));
        let order_id = err.order_id.unwrap();
        assert!(db.inner().orders().get_by_id(&order_id).await.unwrap().is_some());
        assert_eq!(cart.with_cart(|c| c.total_item_count()), 2);
    }

    #[tokio::test]
    async fn test_items_added_while_placing_stay_in_cart() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Kopi Kapal Api", 1500, 10).await;
        let q = seed_product(&db, "Gula", 17500, 10).await;
        let dir = TempDir::new().unwrap();
        let cart = filled_cart(&dir, &p, 2);
        let config = ConsoleConfig::default();
        let order_form = form(FulfillmentKind::Pickup, None, PaymentMethod::Cash);

        let (placed, ()) = tokio::join!(
            place_storefront_order(&db, &cart, &config, &order_form),
            async {
                cart.with_cart_mut(|c| {
                    c.add_item(&p, 3).unwrap();
                    c.add_item(&q, 1).unwrap();
                })
                .unwrap();
            },
        );

        let resp = placed.unwrap();
        let lines = db.inner().orders().lines(&resp.order_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);

        cart.with_cart(|c| {
            assert_eq!(c.quantity_of(&p.id), 3);
            assert_eq!(c.quantity_of(&q.id), 1);
        });
        let reloaded = StorefrontCartState::load(cart.path());
        assert_eq!(reloaded.with_cart(|c| c.total_item_count()), 4);
    }
}
