//! Cart flows through the full storefront router.
//!
//! Every request in a test shares one session cookie, the same way a browser
//! tab would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{StatusCode, header};
use byte_mtaani_integration_tests::TestContext;
use byte_mtaani_storefront::routes::cart::CART_UPDATED_EVENT;

fn quantities(body: &serde_json::Value) -> Vec<(String, u64)> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            (
                item["product_id"].as_str().unwrap().to_string(),
                item["quantity"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_new_visitor_has_empty_cart() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(quantities(&response.body).is_empty());
    assert_eq!(response.body["subtotal"], "KES 0.00");
    assert_eq!(response.body["item_count"], 0);

    let count = ctx.get("/cart/count").await;
    assert_eq!(count.body["count"], 0);
}

#[tokio::test]
async fn test_add_twice_merges_into_one_line() {
    let mut ctx = TestContext::new();

    let first = ctx.post_form("/cart/add", "product_id=1").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.headers.get("HX-Trigger").unwrap(), CART_UPDATED_EVENT);
    assert_eq!(quantities(&first.body), vec![("1".to_string(), 1)]);

    let second = ctx.post_form("/cart/add", "product_id=1").await;
    assert_eq!(quantities(&second.body), vec![("1".to_string(), 2)]);
    assert_eq!(second.body["items"][0]["line_price"], "KES 119.98");

    let cart = ctx.get("/cart").await;
    assert_eq!(quantities(&cart.body), vec![("1".to_string(), 2)]);
    assert!(cart.headers.get("HX-Trigger").is_none());
}

#[tokio::test]
async fn test_lines_keep_insertion_order() {
    let mut ctx = TestContext::new();

    ctx.post_form("/cart/add", "product_id=2").await;
    ctx.post_form("/cart/add", "product_id=1").await;
    ctx.post_form("/cart/add", "product_id=2").await;

    let cart = ctx.get("/cart").await;
    assert_eq!(
        quantities(&cart.body),
        vec![("2".to_string(), 2), ("1".to_string(), 1)]
    );
    assert_eq!(cart.body["item_count"], 3);
    assert_eq!(cart.body["subtotal"], "KES 219.97");
}

#[tokio::test]
async fn test_update_quantity() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;

    let response = ctx
        .post_form("/cart/update", "product_id=1&quantity=5")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response.body), vec![("1".to_string(), 5)]);

    let count = ctx.get("/cart/count").await;
    assert_eq!(count.body["count"], 5);
}

#[tokio::test]
async fn test_update_to_zero_or_less_removes_line() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;
    ctx.post_form("/cart/add", "product_id=3").await;

    let response = ctx
        .post_form("/cart/update", "product_id=1&quantity=0")
        .await;
    assert_eq!(quantities(&response.body), vec![("3".to_string(), 1)]);

    let response = ctx
        .post_form("/cart/update", "product_id=3&quantity=-2")
        .await;
    assert!(quantities(&response.body).is_empty());
}

#[tokio::test]
async fn test_update_missing_line_is_noop() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;

    let response = ctx
        .post_form("/cart/update", "product_id=2&quantity=4")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response.body), vec![("1".to_string(), 1)]);
}

#[tokio::test]
async fn test_remove_line_and_unknown_id() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;
    ctx.post_form("/cart/add", "product_id=2").await;

    let response = ctx.post_form("/cart/remove", "product_id=1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response.body), vec![("2".to_string(), 1)]);

    let response = ctx.post_form("/cart/remove", "product_id=999").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get("HX-Trigger").is_none());
    assert_eq!(quantities(&response.body), vec![("2".to_string(), 1)]);
}

#[tokio::test]
async fn test_noop_changes_do_not_start_a_session() {
    let ctx = TestContext::new();

    for (path, form) in [
        ("/cart/remove", "product_id=nope"),
        ("/cart/update", "product_id=nope&quantity=3"),
        ("/cart/clear", ""),
    ] {
        let mut visitor = ctx.new_visitor();
        let response = visitor.post_form(path, form).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.get(header::SET_COOKIE).is_none(), "{path}");
        assert!(response.headers.get("HX-Trigger").is_none(), "{path}");
        assert!(quantities(&response.body).is_empty());
    }
}

#[tokio::test]
async fn test_huge_quantity_renders_saturated_totals() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;

    let form = format!("product_id=1&quantity={}", i64::MAX);
    let response = ctx.post_form("/cart/update", &form).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_count"], u64::from(u32::MAX));

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["items"][0]["quantity"], u64::from(u32::MAX));
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let mut ctx = TestContext::new();
    ctx.post_form("/cart/add", "product_id=1").await;
    ctx.post_form("/cart/add", "product_id=2").await;

    let response = ctx.post_form("/cart/clear", "").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("HX-Trigger").unwrap(), CART_UPDATED_EVENT);
    assert!(quantities(&response.body).is_empty());

    let cart = ctx.get("/cart").await;
    assert!(quantities(&cart.body).is_empty());
    assert_eq!(cart.body["subtotal"], "KES 0.00");
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let mut ctx = TestContext::new();

    let response = ctx.post_form("/cart/add", "product_id=404").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let cart = ctx.get("/cart").await;
    assert!(quantities(&cart.body).is_empty());
}

#[tokio::test]
async fn test_blank_product_id_is_bad_request() {
    let mut ctx = TestContext::new();

    let response = ctx.post_form("/cart/add", "product_id=%20%20").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post_form("/cart/update", "product_id=&quantity=2")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visitors_have_separate_carts() {
    let mut alice = TestContext::new();
    let mut bob = alice.new_visitor();

    alice.post_form("/cart/add", "product_id=1").await;
    bob.post_form("/cart/add", "product_id=2").await;
    bob.post_form("/cart/add", "product_id=2").await;

    let alice_cart = alice.get("/cart").await;
    assert_eq!(quantities(&alice_cart.body), vec![("1".to_string(), 1)]);

    let bob_cart = bob.get("/cart").await;
    assert_eq!(quantities(&bob_cart.body), vec![("2".to_string(), 2)]);
}
