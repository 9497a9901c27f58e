//! # Catalog Commands
//!
//! Browsing (storefront and till) and the small reference lists the
//! product form draws from.

use tracing::info;
use warung_core::catalog::{category_options, filter_products, resolve_sections, ResolvedSection};
use warung_core::validation::{validate_required, validate_search_query};
use warung_core::{Category, Product, StorefrontSection, Unit};

use crate::error::ApiError;
use crate::state::{DbState, StockState};

/// Products matching a name search within a category (`"All"` for any).
pub fn browse_products(
    stock: &StockState,
    query: &str,
    category: &str,
) -> Result<Vec<Product>, ApiError> {
    let query = validate_search_query(query)?;
    let products = stock.products();
    Ok(filter_products(&products, &query, category)
        .into_iter()
        .cloned()
        .collect())
}

/// Category filter chips: "All" then every category in use.
pub fn browse_categories(stock: &StockState) -> Vec<String> {
    category_options(&stock.products())
}

/// Storefront sections in display order, with their current products.
pub async fn storefront_sections(
    db: &DbState,
    stock: &StockState,
) -> Result<Vec<ResolvedSection>, ApiError> {
    let sections = db.inner().sections().list().await?;
    Ok(resolve_sections(&sections, &stock.products()))
}

pub async fn save_section(db: &DbState, section: &StorefrontSection) -> Result<(), ApiError> {
    let mut section = section.clone();
    section.name = validate_required("section name", &section.name)?;
    db.inner().sections().upsert(&section).await?;
    Ok(())
}

pub async fn delete_section(db: &DbState, section_id: &str) -> Result<(), ApiError> {
    Ok(db.inner().sections().delete(section_id).await?)
}

pub async fn list_categories(db: &DbState) -> Result<Vec<Category>, ApiError> {
    Ok(db.inner().categories().list().await?)
}

pub async fn add_category(db: &DbState, name: &str) -> Result<Category, ApiError> {
    let name = validate_required("category name", name)?;
    let category = db.inner().categories().add(&name).await?;
    info!(name = %category.name, "Category added");
    Ok(category)
}

pub async fn delete_category(db: &DbState, category_id: &str) -> Result<(), ApiError> {
    Ok(db.inner().categories().delete(category_id).await?)
}

pub async fn list_units(db: &DbState) -> Result<Vec<Unit>, ApiError> {
    Ok(db.inner().units().list().await?)
}

pub async fn add_unit(db: &DbState, name: &str) -> Result<Unit, ApiError> {
    let name = validate_required("unit name", name)?;
    Ok(db.inner().units().add(&name).await?)
}

pub async fn delete_unit(db: &DbState, unit_id: &str) -> Result<(), ApiError> {
    Ok(db.inner().units().delete(unit_id).await?)
}
