//! Cache types for Catalog API responses.

use byte_mtaani_core::{Product, ProductId};

use super::types::{ProductPage, ProductQuery};

/// Cache key for products and listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
}
