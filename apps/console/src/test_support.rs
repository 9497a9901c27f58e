//! Fixtures shared by the command tests.

use chrono::Utc;
use uuid::Uuid;
use warung_core::Product;

use crate::state::{DbState, PosCartState, StockState};

pub async fn seed_product(db: &DbState, name: &str, price: i64, stock: i64) -> Product {
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        category: "Sembako".to_string(),
        unit: "pcs".to_string(),
        price,
        stock,
        image_url: None,
        created_at: Utc::now(),
    };
    db.inner().products().insert(&product).await.unwrap();
    product
}

/// A stock view loaded from `db`.
pub async fn stocked(db: &DbState) -> StockState {
    let stock = StockState::new();
    stock.refresh(db.inner()).await.unwrap();
    stock
}

/// A till cart holding `quantity` of `product`.
pub fn pos_cart_with(stock: &StockState, product: &Product, quantity: i64) -> PosCartState {
    let cart = PosCartState::new();
    stock.with_ledger(|ledger| {
        cart.with_cart_mut(|c| {
            for _ in 0..quantity {
                c.add_item(product, ledger).unwrap();
            }
        })
    });
    cart
}

/// Makes every statement of `sql_event` on `table` fail with `message`.
pub async fn fail_on(db: &DbState, table: &str, sql_event: &str, message: &str) {
    let sql = format!(
        "CREATE TRIGGER fail_{table}_{event} BEFORE {sql_event} ON {table} \
         BEGIN SELECT RAISE(ABORT, '{message}'); END",
        event = sql_event.to_lowercase(),
    );
    sqlx::query(&sql).execute(db.inner().pool()).await.unwrap();
}

pub async fn stock_of(db: &DbState, product_id: &str) -> i64 {
    db.inner()
        .products()
        .get_by_id(product_id)
        .await
        .unwrap()
        .map(|p| p.stock)
        .unwrap_or(-1)
}
