//! Cart line items and the pure transforms over them.
//!
//! A [`Cart`] is an insertion-ordered list holding at most one [`CartItem`]
//! per product id. All mutation goes through the methods here so that the
//! invariant holds no matter where a cart came from; persistence lives in the
//! storefront crate.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// A product snapshot and how many of it the visitor wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// A new line with quantity 1.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity.get())
    }
}

/// An ordered collection of cart lines, unique by product id.
///
/// Serializes as a bare JSON array of `{ "product": …, "quantity": n }`.
/// Deserializing an array that repeats a product merges the repeats into the
/// first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == id)
    }

    /// Add one unit of a product.
    ///
    /// An existing line keeps its position and its original product snapshot;
    /// only the quantity grows. Otherwise a new line is appended.
    pub fn add(&mut self, product: Product) {
        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self.items.push(CartItem::new(product)),
        }
    }

    /// Remove the line for a product. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product.id != id);
        self.items.len() != before
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Quantities above
    /// `u32::MAX` saturate. Unknown ids are ignored. Returns whether the cart
    /// changed.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        let Some(quantity) = u32::try_from(quantity.max(0))
            .map_or(Some(NonZeroU32::MAX), NonZeroU32::new)
        else {
            return self.remove(id);
        };

        match self.items.iter_mut().find(|item| &item.product.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged
                .iter_mut()
                .find(|existing| existing.product.id == item.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity.get());
                }
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
