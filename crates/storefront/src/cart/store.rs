//! Durable key-value slot holding the serialized cart.
//!
//! The cart lives under one fixed key as a JSON array string. Reads never
//! fail: a missing, unreadable or malformed value loads as an empty cart, so a
//! broken slot degrades to "empty on reload" instead of an error page.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use byte_mtaani_core::Cart;
use thiserror::Error;
use tower_sessions::Session;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session store rejected the read or write.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A previous writer panicked while holding the lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string-keyed slot of string values.
pub trait CartStorage: Send + Sync {
    /// Read the raw value under `key`.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Overwrite the value under `key`.
    fn write(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Storage bound to the visitor's browser session.
///
/// `Unavailable` covers requests that reach a handler without a session
/// layer: nothing is read and writes are discarded.
#[derive(Debug, Clone)]
pub enum BrowserStorage {
    Session(Session),
    Unavailable,
}

impl BrowserStorage {
    /// Whether writes survive the current request.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

impl CartStorage for BrowserStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Session(session) => Ok(session.get::<String>(key).await?),
            Self::Unavailable => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Self::Session(session) => Ok(session.insert(key, value).await?),
            Self::Unavailable => Ok(()),
        }
    }
}

/// In-process storage shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_owned(), value);
        Ok(())
    }
}

/// A cart read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCart {
    pub cart: Cart,
    /// The slot held a value that did not parse as a cart.
    pub malformed: bool,
}

impl StoredCart {
    const fn valid(cart: Cart) -> Self {
        Self {
            cart,
            malformed: false,
        }
    }
}

/// The cart's persistent store: a storage backend plus the key it uses.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
    key: String,
}

impl<S: CartStorage> CartStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Load the stored cart, or an empty one.
    pub async fn load(&self) -> Cart {
        self.load_stored().await.cart
    }

    /// Load the stored cart along with whether the stored value was
    /// malformed and should be overwritten.
    pub async fn load_stored(&self) -> StoredCart {
        let raw = match self.storage.read(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredCart::valid(Cart::new()),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cart storage unreadable, using empty cart");
                return StoredCart::valid(Cart::new());
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => StoredCart::valid(cart),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored cart is malformed, using empty cart");
                StoredCart {
                    cart: Cart::new(),
                    malformed: true,
                }
            }
        }
    }

    /// Replace the stored cart with a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails. The
    /// previous value is left untouched in that case.
    pub async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.storage.write(&self.key, raw).await
    }

    /// The underlying storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}
