//! Row builders shared by the repository tests.

use chrono::Utc;
use uuid::Uuid;
use warung_core::{
    CreditTab, FulfillmentKind, Order, OrderLine, OrderStatus, PaymentMethod, Product, TabStatus,
};

pub fn product(name: &str, price: i64, stock: i64) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        category: "Sembako".to_string(),
        unit: "pcs".to_string(),
        price,
        stock,
        image_url: None,
        created_at: Utc::now(),
    }
}

pub fn order(status: OrderStatus, total_amount: i64) -> Order {
    Order {
        id: Uuid::new_v4().to_string(),
        buyer_name: "Rina".to_string(),
        note: None,
        total_amount,
        status,
        payment_method: PaymentMethod::Cash,
        fulfillment: FulfillmentKind::Pickup,
        delivery_address: None,
        created_at: Utc::now(),
    }
}

pub fn line(order_id: &str, name: &str, quantity: i64, unit_price: i64) -> OrderLine {
    OrderLine {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        product_id: Uuid::new_v4().to_string(),
        product_name: name.to_string(),
        quantity,
        unit_price,
        created_at: Utc::now(),
    }
}

pub fn tab(customer: &str, amount: i64) -> CreditTab {
    CreditTab {
        id: Uuid::new_v4().to_string(),
        customer_name: customer.to_string(),
        summary: "POS purchase: Beras x1".to_string(),
        amount,
        status: TabStatus::Open,
        order_id: None,
        created_at: Utc::now(),
        settled_at: None,
        charges: Vec::new(),
    }
}
