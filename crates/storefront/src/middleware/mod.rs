//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`, capture errors)
//! 2. Request ID (add unique ID to each request)
//! 3. `TraceLayer` (request span carrying the request ID)
//! 4. Session layer (tower-sessions with in-memory store; holds the cart)

pub mod request_id;
pub mod session;

pub use request_id::{REQUEST_ID_HEADER, RequestId, make_span, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
