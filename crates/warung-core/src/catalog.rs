//! # Catalog Helpers
//!
//! Read-side helpers for the storefront and the admin dashboard:
//! search/category filtering, featured sections and the low-stock list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Product, StorefrontSection};

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// How many products the low-stock panel shows.
pub const LOW_STOCK_LIMIT: usize = 5;

/// Products whose name contains `query` (case-insensitive) and whose
/// category matches, with [`ALL_CATEGORIES`] matching everything.
pub fn filter_products<'a>(products: &'a [Product], query: &str, category: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();

    products
        .iter()
        .filter(|p| category == ALL_CATEGORIES || p.category == category)
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

/// `"All"` followed by each category used by a product, first seen first.
pub fn category_options(products: &[Product]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !options.iter().any(|c| *c == product.category) {
            options.push(product.category.clone());
        }
    }
    options
}

/// A section with its products looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedSection {
    pub id: String,
    pub name: String,
    pub products: Vec<Product>,
}

/// Sections in display order, each with the featured products that still
/// exist. Sections left with no products are dropped.
pub fn resolve_sections(sections: &[StorefrontSection], products: &[Product]) -> Vec<ResolvedSection> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut ordered: Vec<&StorefrontSection> = sections.iter().collect();
    ordered.sort_by_key(|s| s.display_order);

    ordered
        .into_iter()
        .filter_map(|section| {
            let featured: Vec<Product> = section
                .product_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).map(|p| (*p).clone()))
                .collect();

            if featured.is_empty() {
                return None;
            }

            Some(ResolvedSection {
                id: section.id.clone(),
                name: section.name.clone(),
                products: featured,
            })
        })
        .collect()
}

/// Products with stock below `threshold`, lowest first, at most
/// [`LOW_STOCK_LIMIT`].
pub fn low_stock(products: &[Product], threshold: i64) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.stock < threshold)
        .cloned()
        .collect();
    low.sort_by_key(|p| p.stock);
    low.truncate(LOW_STOCK_LIMIT);
    low
}
