//! Product listing and detail against an unreachable catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use byte_mtaani_integration_tests::{TestContext, UNREACHABLE_CATALOG};
use byte_mtaani_storefront::config::StorefrontConfig;
use url::Url;

#[tokio::test]
async fn test_health() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_listing_serves_fallback_products() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["fallback"], true);
    assert_eq!(response.body["count"], 3);

    let products = response.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0]["name"], "Wireless Headphones");
    assert_eq!(products[0]["price"], "KES 59.99");
    assert_eq!(products[0]["in_stock"], true);
    assert_eq!(products[0]["rating"], "4.5");
    assert_eq!(products[0]["reviews"], 120);
}

#[tokio::test]
async fn test_listing_filters_fallback_by_category() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/products?category=audio").await;
    let products = response.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Bluetooth Speaker");
}

#[tokio::test]
async fn test_detail_from_fallback() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/products/2").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "2");
    assert_eq!(response.body["name"], "Smart Watch");
    assert_eq!(response.body["category"], "Wearables");
}

#[tokio::test]
async fn test_detail_unknown_product_is_not_found() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/products/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_catalog_without_fallback_is_bad_gateway() {
    let mut config = StorefrontConfig::local(Url::parse(UNREACHABLE_CATALOG).unwrap());
    config.catalog.fallback = false;
    let mut ctx = TestContext::with_config(config);

    let response = ctx.get("/products").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    let response = ctx.post_form("/cart/add", "product_id=1").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}
