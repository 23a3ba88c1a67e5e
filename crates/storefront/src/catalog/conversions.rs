//! Normalization from Catalog API shapes to the canonical `Product`.

use std::str::FromStr;

use byte_mtaani_core::{CurrencyCode, Price, Product, ProductId};
use rust_decimal::Decimal;
use serde_json::Value;

use super::CatalogError;
use super::types::{ProductPage, ProductQuery, RawProduct, RawProductList};

/// Image shown when the catalog has none.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";

/// Category used when the catalog has none.
pub const UNCATEGORIZED: &str = "Uncategorized";

const UNTITLED: &str = "Untitled product";

/// Highest review score.
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Convert a raw product, rejecting entries without a usable id.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidProduct`] when the id is missing or blank.
pub fn convert_product(raw: RawProduct) -> Result<Product, CatalogError> {
    let id = raw
        .id
        .as_ref()
        .and_then(value_to_string)
        .ok_or_else(|| CatalogError::InvalidProduct("missing id".to_string()))?;
    let id = ProductId::parse(&id).map_err(|e| CatalogError::InvalidProduct(e.to_string()))?;

    let name = [raw.product_name, raw.title, raw.name]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let image_url = [raw.image_url, raw.image]
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let category = raw
        .category
        .as_ref()
        .and_then(category_name)
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    Ok(Product {
        id,
        name,
        url_key: raw.url_key.filter(|k| !k.is_empty()),
        description: raw.description.unwrap_or_default(),
        price: Price::new(
            raw.price.as_ref().map_or(Decimal::ZERO, parse_amount),
            CurrencyCode::KES,
        ),
        image_url,
        category: Some(category),
        in_stock: raw.in_stock.unwrap_or(true),
        stock: raw.stock.map(|s| u32::try_from(s).unwrap_or(0)),
        rating: raw
            .rating
            .as_ref()
            .and_then(parse_decimal)
            .map(|r| r.clamp(Decimal::ZERO, MAX_RATING)),
        reviews: raw.reviews.map(|r| u32::try_from(r).unwrap_or(0)),
    })
}

/// Convert a listing response into a page, dropping unusable entries.
#[must_use]
pub fn convert_product_list(list: RawProductList, query: &ProductQuery) -> ProductPage {
    let (raw, count, has_next, has_previous) = match list {
        RawProductList::Page {
            count,
            next,
            previous,
            results,
        } => (results, count, next.is_some(), previous.is_some()),
        RawProductList::List(items) => {
            let count = items.len() as u64;
            (items, count, false, query.page() > 1)
        }
    };

    let products = raw
        .into_iter()
        .filter_map(|item| match convert_product(item) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping catalog product");
                None
            }
        })
        .collect();

    ProductPage {
        products,
        count,
        has_next,
        has_previous,
        fallback: false,
    }
}

/// Parse a price that may be a JSON number or a numeric string.
///
/// Anything unparseable becomes zero.
fn parse_amount(value: &Value) -> Decimal {
    parse_decimal(value).unwrap_or(Decimal::ZERO)
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A category is either a plain id/name or a nested category object.
fn category_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => ["Category_name", "name", "url_key", "id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(value_to_string)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_backend_shape() {
        let product = convert_product(raw(json!({
            "id": "3f2c",
            "product_name": "Play Game Controller",
            "url_key": "play-game-controller",
            "description": "Wireless controller",
            "price": "2000.00",
            "category": "9a1b",
            "stock": 4,
            "in_stock": true,
            "image_url": "https://cdn.example/controller.png"
        })))
        .unwrap();

        assert_eq!(product.id.as_str(), "3f2c");
        assert_eq!(product.name, "Play Game Controller");
        assert_eq!(product.price.amount, Decimal::new(2000, 0));
        assert_eq!(product.image_url, "https://cdn.example/controller.png");
        assert_eq!(product.stock, Some(4));
        assert_eq!(product.category.as_deref(), Some("9a1b"));
    }

    #[test]
    fn test_title_shape_with_numeric_price() {
        let product = convert_product(raw(json!({
            "id": 2,
            "title": "Smart Watch",
            "price": 79.99,
            "image": "/images/watch.jpg"
        })))
        .unwrap();

        assert_eq!(product.id.as_str(), "2");
        assert_eq!(product.name, "Smart Watch");
        assert_eq!(product.price.amount, Decimal::new(7999, 2));
        assert_eq!(product.image_url, "/images/watch.jpg");
        assert!(product.in_stock);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let product = convert_product(raw(json!({ "id": "x", "price": "n/a" }))).unwrap();

        assert_eq!(product.name, UNTITLED);
        assert_eq!(product.price.amount, Decimal::ZERO);
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(product.category.as_deref(), Some(UNCATEGORIZED));
        assert_eq!(product.stock, None);
        assert_eq!(product.rating, None);
        assert_eq!(product.reviews, None);
    }

    #[test]
    fn test_rating_and_reviews() {
        let product = convert_product(raw(json!({
            "id": "1",
            "product_name": "Wireless Headphones",
            "rating": 4.5,
            "reviews": 120
        })))
        .unwrap();
        assert_eq!(product.rating, Some(Decimal::new(45, 1)));
        assert_eq!(product.reviews, Some(120));

        let product = convert_product(raw(json!({
            "id": "2",
            "rating": "9",
            "reviews": -3
        })))
        .unwrap();
        assert_eq!(product.rating, Some(Decimal::new(5, 0)));
        assert_eq!(product.reviews, Some(0));

        let product = convert_product(raw(json!({ "id": "3", "rating": "great" }))).unwrap();
        assert_eq!(product.rating, None);
    }

    #[test]
    fn test_nested_category_and_out_of_stock() {
        let product = convert_product(raw(json!({
            "id": "x",
            "product_name": "Speaker",
            "category": { "id": "c1", "Category_name": "Audio" },
            "in_stock": false,
            "stock": -1
        })))
        .unwrap();

        assert_eq!(product.category.as_deref(), Some("Audio"));
        assert!(!product.in_stock);
        assert_eq!(product.stock, Some(0));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = convert_product(raw(json!({ "product_name": "Ghost" })));
        assert!(matches!(result, Err(CatalogError::InvalidProduct(_))));
    }

    #[test]
    fn test_list_skips_invalid_entries() {
        let list: RawProductList = serde_json::from_value(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                { "id": "a", "product_name": "Mouse", "price": "10" },
                { "product_name": "No id" }
            ]
        }))
        .unwrap();

        let page = convert_product_list(list, &ProductQuery::default());
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.count, 2);
        assert!(!page.has_next);
        assert!(!page.fallback);
    }
}
