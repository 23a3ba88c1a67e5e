//! Catalog API wire types.
//!
//! The API (and older fixtures) disagree on field names: a product may carry
//! `product_name`, `title` or `name`, prices arrive as numbers or strings, and
//! `category` is either an id or a nested object. These types accept all of
//! it; [`super::conversions`] turns them into the one canonical
//! [`Product`](byte_mtaani_core::Product).

use byte_mtaani_core::Product;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A product exactly as the Catalog API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub reviews: Option<i64>,
}

/// Listing response: a paginated envelope or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawProductList {
    Page {
        count: u64,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<RawProduct>,
    },
    List(Vec<RawProduct>),
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs for the non-empty filters.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }

    /// Requested page, 1-based.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of normalized products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total matching products across all pages.
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    /// Whether these came from the built-in fallback set.
    pub fallback: bool,
}
