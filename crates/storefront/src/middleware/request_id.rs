//! Request ID middleware for request tracing and correlation.
//!
//! An upstream proxy may already have assigned an `x-request-id`; otherwise a
//! UUID v4 is generated. The ID is stored as a [`RequestId`] extension so the
//! trace span built in [`make_span`] can pick it up, tagged on the Sentry
//! scope, and echoed back in the response headers.

use axum::{
    extract::Request,
    http::{HeaderValue, Request as HttpRequest},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request's correlation ID.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that ensures every request carries a [`RequestId`].
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Span constructor for `TraceLayer` that includes the request ID.
pub fn make_span<B>(request: &HttpRequest<B>) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or("-", |id| id.0.as_str());

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
