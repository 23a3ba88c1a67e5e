//! Integration tests for the byteMtaani storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p byte-mtaani-integration-tests
//! ```
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`. The
//! catalog points at a port nothing listens on, so every product comes from
//! the built-in fallback set and no network access is needed.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart flows across requests sharing one session
//! - `storefront_products` - Product listing and detail

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use byte_mtaani_storefront::{config::StorefrontConfig, routes, state::AppState};
use tower::ServiceExt;
use url::Url;

/// Catalog address that refuses connections.
pub const UNREACHABLE_CATALOG: &str = "http://127.0.0.1:9";

/// Response pieces the tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// A storefront instance plus one visitor's session cookie.
pub struct TestContext {
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// Storefront with fallback products enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::local(
            Url::parse(UNREACHABLE_CATALOG).unwrap(),
        ))
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let state = AppState::new(config).unwrap();
        Self {
            app: routes::app(state),
            cookie: None,
        }
    }

    /// Another visitor on the same server.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request.body(Body::empty()).unwrap()).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&mut self, path: &str, form: &str) -> TestResponse {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()));

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
