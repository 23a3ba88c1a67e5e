//! Cart route handlers.
//!
//! Each handler gets its own [`CartContext`] from the request's session. The
//! mutating handlers subscribe to the context before changing anything and
//! render the republished cart, adding an `HX-Trigger: cart-updated` header so
//! other fragments on the page (the header badge, the summary) refresh too.

use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use byte_mtaani_core::{Cart, CartItem, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::instrument;

use crate::cart::{BrowserStorage, CartContext, CartStatus};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Event name sent in `HX-Trigger` after the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub url_key: Option<String>,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::new())
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal().to_string(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.to_string(),
            name: item.product.name.clone(),
            url_key: item.product.url_key.clone(),
            image_url: item.product.image_url.clone(),
            quantity: item.quantity.get(),
            price: item.product.price.to_string(),
            line_price: item.line_total().to_string(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Clone, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Render the latest published cart.
fn render(updates: &mut watch::Receiver<CartStatus>) -> Response {
    let changed = updates.has_changed().unwrap_or(false);
    let view = updates
        .borrow_and_update()
        .cart()
        .map_or_else(CartView::empty, CartView::from);

    if changed {
        (
            AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
            Json(view),
        )
            .into_response()
    } else {
        Json(view).into_response()
    }
}

/// Display the cart.
#[instrument(skip(cart))]
pub async fn show(cart: CartContext<BrowserStorage>) -> Json<CartView> {
    Json(CartView::from(&cart.cart().await))
}

/// Add one unit of a product.
///
/// The product is resolved through the catalog so the cart only ever stores
/// normalized products.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    cart: CartContext<BrowserStorage>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.product_id)?;
    let product = state.catalog().product_or_fallback(&id).await?;

    let mut updates = cart.subscribe();
    cart.add_item(product).await?;
    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));

    Ok(render(&mut updates))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(cart))]
pub async fn update(
    cart: CartContext<BrowserStorage>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.product_id)?;

    let mut updates = cart.subscribe();
    cart.update_quantity(&id, form.quantity).await?;
    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[
            ("product_id", id.as_str()),
            ("quantity", &form.quantity.to_string()),
        ]),
    );

    Ok(render(&mut updates))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove(
    cart: CartContext<BrowserStorage>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.product_id)?;

    let mut updates = cart.subscribe();
    cart.remove_item(&id).await?;
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));

    Ok(render(&mut updates))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(cart: CartContext<BrowserStorage>) -> Result<Response> {
    let mut updates = cart.subscribe();
    cart.clear().await?;
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(render(&mut updates))
}

/// Get cart count badge.
#[instrument(skip(cart))]
pub async fn count(cart: CartContext<BrowserStorage>) -> Json<CartCount> {
    Json(CartCount {
        count: cart.cart().await.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::test_support::product;

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add(product("P1", 2000));
        cart.add(product("P1", 2000));
        cart.add(product("P2", 500));

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "KES 4500.00");
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].price, "KES 2000.00");
        assert_eq!(view.items[0].line_price, "KES 4000.00");
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, "KES 0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_render_without_change_has_no_trigger() {
        let (_tx, mut rx) = watch::channel(CartStatus::Ready(Cart::new()));
        let response = render(&mut rx);
        assert!(response.headers().get("HX-Trigger").is_none());
    }

    #[test]
    fn test_render_after_publish_triggers_update() {
        let (tx, mut rx) = watch::channel(CartStatus::Uninitialized);
        let mut cart = Cart::new();
        cart.add(product("P1", 10));
        tx.send_replace(CartStatus::Ready(cart));

        let response = render(&mut rx);
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            CART_UPDATED_EVENT
        );
    }
}
