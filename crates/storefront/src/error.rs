//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use byte_mtaani_core::IdError;
use thiserror::Error;

use crate::cart::StorageError;
use crate::catalog::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart persistence failed.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<IdError> for AppError {
    fn from(err: IdError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // A catalog 404 is the client's problem, not ours
        let this = match self {
            Self::Catalog(CatalogError::NotFound(what)) => Self::NotFound(what),
            other => other,
        };

        // Capture server errors to Sentry
        if matches!(
            this,
            Self::Storage(_) | Self::Internal(_) | Self::Catalog(_)
        ) {
            let event_id = sentry::capture_error(&this);
            tracing::error!(
                error = %this,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &this {
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Catalog(CatalogError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &this {
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Catalog(_) => "External service error".to_string(),
            _ => this.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Storage(StorageError::Poisoned)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_errors_map_to_gateway_statuses() {
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::RateLimited(5))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::InvalidProduct(
                "missing id".to_string()
            ))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_blank_id_is_bad_request() {
        let err = AppError::from(IdError::Empty("ProductId"));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}
