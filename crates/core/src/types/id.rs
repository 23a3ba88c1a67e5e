//! Newtype IDs for type-safe entity references.
//!
//! The Catalog API identifies everything with opaque strings (UUIDs in
//! production, short numeric strings in fixtures). Use the `define_id!` macro
//! to create wrappers that prevent accidentally mixing IDs from different
//! entity types.

use thiserror::Error;

/// Error returned when parsing an ID from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The ID was empty or only whitespace.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `parse()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use byte_mtaani_core::define_id;
/// define_id!(ProductId);
/// define_id!(OrderId);
///
/// let product_id = ProductId::new("P1");
/// let order_id = OrderId::new("P1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse an ID from untrusted input, trimming whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::Empty`](crate::IdError::Empty) if nothing is left after trimming.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::Empty(stringify!($name)));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
