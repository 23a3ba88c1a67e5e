//! Built-in products served while the Catalog API is unreachable.

use byte_mtaani_core::{CurrencyCode, Price, Product, ProductId};
use rust_decimal::Decimal;

use super::types::{ProductPage, ProductQuery};

/// The fallback product set.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        product(
            "1",
            "Wireless Headphones",
            "High-quality wireless headphones with noise cancellation.",
            Decimal::new(5999, 2),
            "/images/product-img1.jpg",
            "Electronics",
            (Decimal::new(45, 1), 120),
        ),
        product(
            "2",
            "Smart Watch",
            "Fitness tracking watch with heart rate monitoring.",
            Decimal::new(7999, 2),
            "/images/product-img11.jpg",
            "Wearables",
            (Decimal::new(42, 1), 80),
        ),
        product(
            "3",
            "Bluetooth Speaker",
            "Portable speaker with deep bass and long battery life.",
            Decimal::new(3999, 2),
            "/images/product-4.jpg",
            "Audio",
            (Decimal::new(48, 1), 200),
        ),
    ]
}

/// Look up a fallback product by id.
#[must_use]
pub fn find(id: &ProductId) -> Option<Product> {
    products().into_iter().find(|p| &p.id == id)
}

/// Apply listing filters to the fallback set. There is only one page.
#[must_use]
pub fn page(query: &ProductQuery) -> ProductPage {
    let category = query.category.as_deref().map(str::to_lowercase);
    let search = query.search.as_deref().map(str::to_lowercase);

    let products: Vec<Product> = if query.page() > 1 {
        Vec::new()
    } else {
        products()
            .into_iter()
            .filter(|p| {
                category.as_deref().is_none_or(|c| {
                    c.is_empty()
                        || p.category
                            .as_deref()
                            .is_some_and(|pc| pc.to_lowercase() == c)
                })
            })
            .filter(|p| {
                search.as_deref().is_none_or(|s| {
                    p.name.to_lowercase().contains(s) || p.description.to_lowercase().contains(s)
                })
            })
            .collect()
    };

    ProductPage {
        count: products.len() as u64,
        products,
        has_next: false,
        has_previous: query.page() > 1,
        fallback: true,
    }
}

fn product(
    id: &str,
    name: &str,
    description: &str,
    amount: Decimal,
    image_url: &str,
    category: &str,
    (rating, reviews): (Decimal, u32),
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        url_key: Some(name.to_lowercase().replace(' ', "-")),
        description: description.to_string(),
        price: Price::new(amount, CurrencyCode::KES),
        image_url: image_url.to_string(),
        category: Some(category.to_string()),
        in_stock: true,
        stock: None,
        rating: Some(rating),
        reviews: Some(reviews),
    }
}
