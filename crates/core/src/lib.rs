//! byteMtaani Core - Shared types library.
//!
//! This crate provides the domain types used across the workspace:
//! - `storefront` - Public-facing e-commerce site and its cart
//! - `integration-tests` - End-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and pure transforms - no I/O, no
//! session access, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, products, and the cart with its invariants

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
