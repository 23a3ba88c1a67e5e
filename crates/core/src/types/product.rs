//! The canonical product shape.
//!
//! Every product the storefront handles has been normalized into this struct
//! at the catalog boundary. The cart copies it verbatim into each line, so
//! later catalog changes never reach items that are already in a cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Slug used in product URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_key: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    /// Units on hand, when the catalog reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Average review score, 0 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    /// Number of reviews behind `rating`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
}

const fn default_in_stock() -> bool {
    true
}
