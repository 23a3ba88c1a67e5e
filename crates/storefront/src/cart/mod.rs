//! Visitor shopping cart.
//!
//! # Layers
//!
//! - [`store`] - `CartStore`: the serialized cart under one session key
//! - [`service`] - `CartService`: read-modify-write operations over the store
//! - [`context`] - `CartContext`: per-request observable mirror used by handlers
//!
//! ```text
//! handler ──▶ CartContext ──▶ CartService ──▶ CartStore ──▶ session slot
//!    ▲             │
//!    └─ watch ◀────┘ (republished after each change)
//! ```
//!
//! Concurrent requests from one visitor are last write wins: there is no
//! compare-and-swap between the read and the write.

pub mod context;
pub mod service;
pub mod store;

pub use context::{CartContext, CartStatus};
pub use service::{CartOp, CartService, CartUpdate};
pub use store::{
    BrowserStorage, CartStorage, CartStore, MemoryStorage, StorageError, StoredCart,
};

#[cfg(test)]
pub(crate) mod test_support {
    use byte_mtaani_core::{Cart, CurrencyCode, Price, Product, ProductId};
    use rust_decimal::Decimal;

    pub fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            url_key: None,
            description: String::new(),
            price: Price::new(Decimal::new(price, 0), CurrencyCode::KES),
            image_url: "/placeholder.png".to_string(),
            category: None,
            in_stock: true,
            stock: None,
            rating: None,
            reviews: None,
        }
    }

    pub fn quantities(cart: &Cart) -> Vec<(&str, u32)> {
        cart.iter()
            .map(|item| (item.product.id.as_str(), item.quantity.get()))
            .collect()
    }
}
