//! byteMtaani Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`cart`] - Session-persisted shopping cart (store, service, context)
//! - [`catalog`] - Catalog API client with normalization and fallback
//! - [`routes`] - Axum handlers and the assembled [`routes::app`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
