//! Observable cart state shared with route handlers.
//!
//! A [`CartContext`] is built explicitly for each request and handed to the
//! handler that needs it; there is no process-wide cart. It mirrors the
//! visitor's stored cart in memory, loads it on first read, and republishes
//! every cart a mutation changes to its subscribers before the mutating call
//! returns. Dropping the context ends its lifetime: receivers see the
//! channel close.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use byte_mtaani_core::{Cart, Product, ProductId};
use tokio::sync::watch;
use tower_sessions::Session;

use super::service::{CartOp, CartService, CartUpdate};
use super::store::{BrowserStorage, CartStorage, CartStore, StorageError};
use crate::state::AppState;

/// Lifecycle of the in-memory mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartStatus {
    /// Nothing has been read from the store yet.
    Uninitialized,
    /// The mirror holds the latest known cart.
    Ready(Cart),
}

impl CartStatus {
    /// The mirrored cart, if initialized.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match self {
            Self::Uninitialized => None,
            Self::Ready(cart) => Some(cart),
        }
    }
}

/// In-memory cart mirror plus the mutators that keep it in sync.
#[derive(Debug)]
pub struct CartContext<S> {
    service: CartService<S>,
    status: watch::Sender<CartStatus>,
}

impl<S: CartStorage> CartContext<S> {
    pub fn new(service: CartService<S>) -> Self {
        let (status, _) = watch::channel(CartStatus::Uninitialized);
        Self { service, status }
    }

    /// Watch the mirror. The receiver sees the current status immediately
    /// and every republished cart after that.
    pub fn subscribe(&self) -> watch::Receiver<CartStatus> {
        self.status.subscribe()
    }

    /// Whether the mirror has been loaded.
    pub fn is_ready(&self) -> bool {
        matches!(*self.status.borrow(), CartStatus::Ready(_))
    }

    /// The current cart, loading it from the store on first use.
    pub async fn cart(&self) -> Cart {
        let mirrored = self.status.borrow().cart().cloned();
        if let Some(cart) = mirrored {
            return cart;
        }

        let cart = self.service.cart().await;
        self.publish(cart.clone());
        cart
    }

    /// Add one unit of `product` and republish.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the mirror is left
    /// as it was.
    pub async fn add_item(&self, product: Product) -> Result<Cart, StorageError> {
        self.apply(CartOp::Add(product)).await
    }

    /// Remove the line for `id` and republish.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn remove_item(&self, id: &ProductId) -> Result<Cart, StorageError> {
        self.apply(CartOp::Remove(id.clone())).await
    }

    /// Set the quantity for `id` and republish.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn update_quantity(
        &self,
        id: &ProductId,
        quantity: i64,
    ) -> Result<Cart, StorageError> {
        self.apply(CartOp::SetQuantity(id.clone(), quantity)).await
    }

    /// Empty the cart and republish.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn clear(&self) -> Result<Cart, StorageError> {
        self.apply(CartOp::Clear).await
    }

    /// Run `op` through the service and mirror the result. Subscribers are
    /// only notified when the cart changed.
    async fn apply(&self, op: CartOp) -> Result<Cart, StorageError> {
        let CartUpdate { cart, changed } = self.service.apply(op).await?;
        let mirrored = cart.clone();
        self.status.send_if_modified(move |status| {
            *status = CartStatus::Ready(mirrored);
            changed
        });
        Ok(cart)
    }

    fn publish(&self, cart: Cart) {
        self.status.send_replace(CartStatus::Ready(cart));
    }
}

/// Builds the visitor's cart context from the session and configured key.
///
/// Without a session layer the context still works but nothing persists.
impl FromRequestParts<AppState> for CartContext<BrowserStorage> {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let storage = match parts.extensions.get::<Session>() {
            Some(session) => BrowserStorage::Session(session.clone()),
            None => {
                tracing::debug!("No session on request, cart will not persist");
                BrowserStorage::Unavailable
            }
        };

        let store = CartStore::new(storage, state.config().cart.storage_key.clone());
        Ok(Self::new(CartService::new(store)))
    }
}
