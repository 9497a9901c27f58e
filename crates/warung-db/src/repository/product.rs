//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD and bulk delete
//! - Floored stock decrement (checkout, order completion)
//! - Manual stock adjustment
//!
//! ## Floored Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET stock = MAX(stock - ?, 0) WHERE id = ?             │
//! │                                                                         │
//! │  stock 5, sell 2  ──► 3                                                │
//! │  stock 1, sell 2  ──► 0   (two tills oversold; drift, not negative)    │
//! │  product deleted  ──► 0 rows, reported as `false`, caller skips        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! One statement, so the read-modify-write happens inside SQLite.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::Product;

const SELECT_PRODUCT: &str = "SELECT id, name, category, unit, price, stock, image_url, created_at \
                              FROM products";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let all = repo.list().await?;
/// let still_there = repo.decrement_stock("uuid-here", 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{} ORDER BY name, id", SELECT_PRODUCT))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{} WHERE id = ?", SELECT_PRODUCT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Products with `stock < threshold`, lowest first.
    pub async fn below_stock(&self, threshold: i64, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{} WHERE stock < ? ORDER BY stock ASC, name ASC LIMIT ?",
            SELECT_PRODUCT
        ))
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, unit, price, stock, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image_url)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates every editable field of a product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, category = ?, unit = ?, price = ?, stock = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image_url)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Takes `quantity` off a product's stock, never below 0.
    ///
    /// ## Returns
    /// `false` when the product no longer exists (nothing was changed).
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<bool> {
        debug!(id = %id, quantity = quantity, "Decrementing stock");

        let result = sqlx::query("UPDATE products SET stock = MAX(stock - ?, 0) WHERE id = ?")
            .bind(quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds `delta` (may be negative) to a product's stock, floored at 0.
    ///
    /// Returns the new stock level.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let stock: Option<i64> = sqlx::query_scalar(
            "UPDATE products SET stock = MAX(stock + ?, 0) WHERE id = ? RETURNING stock",
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        stock.ok_or_else(|| DbError::not_found("Product", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes every product in `ids`. Unknown ids are ignored.
    ///
    /// Returns how many rows were removed.
    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        debug!(count = ids.len(), "Bulk-deleting products");

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM products WHERE id IN ({})", placeholders);

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
