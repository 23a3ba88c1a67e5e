//! Cart operations over the persistent store.
//!
//! Every operation re-reads the store, applies one transform, writes the
//! result back and returns it. Nothing is cached between calls, so callers
//! never need a separate read after a write.

use byte_mtaani_core::{Cart, Product, ProductId};
use tracing::instrument;

use super::store::{CartStorage, CartStore, StorageError, StoredCart};

/// One change to a cart.
#[derive(Debug, Clone)]
pub enum CartOp {
    /// Add one unit, merging with an existing line.
    Add(Product),
    /// Remove a line.
    Remove(ProductId),
    /// Set a line's quantity; zero or less removes it.
    SetQuantity(ProductId, i64),
    /// Remove every line.
    Clear,
}

impl CartOp {
    /// Apply to `cart`, returning whether it changed.
    fn apply(self, cart: &mut Cart) -> bool {
        match self {
            Self::Add(product) => {
                cart.add(product);
                true
            }
            Self::Remove(id) => cart.remove(&id),
            Self::SetQuantity(id, quantity) => cart.set_quantity(&id, quantity),
            Self::Clear => {
                let had_items = !cart.is_empty();
                cart.clear();
                had_items
            }
        }
    }
}

/// The cart after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    pub cart: Cart,
    /// Whether the operation changed the stored cart.
    pub changed: bool,
}

/// Read-modify-write access to one visitor's cart.
#[derive(Debug, Clone)]
pub struct CartService<S> {
    store: CartStore<S>,
}

impl<S: CartStorage> CartService<S> {
    pub const fn new(store: CartStore<S>) -> Self {
        Self { store }
    }

    /// The current stored cart.
    pub async fn cart(&self) -> Cart {
        self.store.load().await
    }

    /// Add one unit of `product`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: Product) -> Result<Cart, StorageError> {
        self.apply(CartOp::Add(product)).await.map(|u| u.cart)
    }

    /// Remove the line for `id`. Unknown ids leave the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: &ProductId) -> Result<Cart, StorageError> {
        self.apply(CartOp::Remove(id.clone()))
            .await
            .map(|u| u.cart)
    }

    /// Set the quantity for `id`; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        id: &ProductId,
        quantity: i64,
    ) -> Result<Cart, StorageError> {
        self.apply(CartOp::SetQuantity(id.clone(), quantity))
            .await
            .map(|u| u.cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty cart cannot be written.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, StorageError> {
        self.apply(CartOp::Clear).await.map(|u| u.cart)
    }

    /// Apply `op` and report whether it changed the cart.
    ///
    /// Nothing is written when the cart is unchanged, unless the stored value
    /// was malformed and must be replaced by the cart callers were handed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    #[instrument(skip_all)]
    pub async fn apply(&self, op: CartOp) -> Result<CartUpdate, StorageError> {
        let StoredCart { mut cart, malformed } = self.store.load_stored().await;
        let changed = op.apply(&mut cart);

        if changed || malformed {
            self.store.save(&cart).await?;
            tracing::debug!(
                changed,
                lines = cart.len(),
                items = cart.item_count(),
                "Cart saved"
            );
        }

        Ok(CartUpdate { cart, changed })
    }
}
