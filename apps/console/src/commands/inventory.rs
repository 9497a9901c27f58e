//! # Inventory Commands
//!
//! Product maintenance and manual stock reconciliation. Every command that
//! can move stock ends with a full refresh of the stock view.

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use warung_core::catalog::LOW_STOCK_LIMIT;
use warung_core::validation::{
    validate_note, validate_price, validate_product_name, validate_required, validate_stock,
    validate_uuid,
};
use warung_core::{CoreResult, Product};

use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::state::{DbState, StockState};

/// Fields of the product form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
}

impl ProductForm {
    /// Validated product; `id`/`created_at` come from `existing` on edit.
    fn to_product(&self, existing: Option<&Product>) -> CoreResult<Product> {
        validate_price(self.price)?;
        validate_stock(self.stock)?;

        Ok(Product {
            id: existing
                .map(|p| p.id.clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: validate_product_name(&self.name)?,
            category: validate_required("category", &self.category)?,
            unit: validate_required("unit", &self.unit)?,
            price: self.price,
            stock: self.stock,
            image_url: validate_note("image url", self.image_url.as_deref())?,
            created_at: existing.map(|p| p.created_at).unwrap_or_else(Utc::now),
        })
    }
}

/// Re-fetches the stock view.
pub async fn refresh_stock(db: &DbState, stock: &StockState) -> Result<usize, ApiError> {
    Ok(stock.refresh(db.inner()).await?)
}

pub async fn create_product(
    db: &DbState,
    stock: &StockState,
    form: &ProductForm,
) -> Result<Product, ApiError> {
    let product = form.to_product(None)?;
    db.inner().products().insert(&product).await?;
    stock.refresh(db.inner()).await?;

    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(product)
}

pub async fn update_product(
    db: &DbState,
    stock: &StockState,
    product_id: &str,
    form: &ProductForm,
) -> Result<Product, ApiError> {
    let existing = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let product = form.to_product(Some(&existing))?;
    db.inner().products().update(&product).await?;
    stock.refresh(db.inner()).await?;
    Ok(product)
}

/// Deletes a selection of products. Past order lines keep their copy of
/// name and price.
pub async fn delete_products(
    db: &DbState,
    stock: &StockState,
    product_ids: &[String],
) -> Result<u64, ApiError> {
    let removed = db.inner().products().delete_many(product_ids).await?;
    stock.refresh(db.inner()).await?;

    info!(requested = product_ids.len(), removed, "Products deleted");
    Ok(removed)
}

/// Moves a product's stock by `delta` (floored at 0) and returns the new
/// level.
pub async fn adjust_stock(
    db: &DbState,
    stock: &StockState,
    product_id: &str,
    delta: i64,
) -> Result<i64, ApiError> {
    debug!(product_id, delta, "adjust_stock command");
    validate_uuid(product_id)?;

    let level = db.inner().products().adjust_stock(product_id, delta).await?;
    stock.refresh(db.inner()).await?;

    info!(product_id, delta, level, "Stock adjusted");
    Ok(level)
}

/// Products under the configured threshold, lowest first.
pub async fn low_stock_report(
    db: &DbState,
    config: &ConsoleConfig,
) -> Result<Vec<Product>, ApiError> {
    Ok(db
        .inner()
        .products()
        .below_stock(config.low_stock_threshold, LOW_STOCK_LIMIT as u32)
        .await?)
}
