//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?category=&search=&page=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart with line totals and subtotal
//! POST /cart/add               - Add one unit (triggers cart-updated)
//! POST /cart/update            - Set quantity, <= 0 removes (triggers cart-updated)
//! POST /cart/remove            - Remove line (triggers cart-updated)
//! POST /cart/clear             - Empty cart (triggers cart-updated)
//! GET  /cart/count             - Cart count badge
//! ```

pub mod cart;
pub mod products;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{create_session_layer, make_span, request_id_middleware};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
}

/// The full application: routes plus the session, tracing and request ID
/// layers. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(make_span::<axum::body::Body>))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
async fn health() -> &'static str {
    "ok"
}
