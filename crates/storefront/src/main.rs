//! byteMtaani Storefront - Public e-commerce site.
//!
//! This binary serves the public-facing storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON view models for HTMX-driven pages
//! - Catalog API (REST) for products, cached in memory
//! - Shopping cart persisted in the visitor's session
//!
//! # Security
//!
//! This binary only has access to:
//! - The Catalog API (read-only product endpoints)
//! - Its own in-memory session store

#![cfg_attr(not(test), forbid(unsafe_code))]

use byte_mtaani_storefront::config::{LogFormat, StorefrontConfig};
use byte_mtaani_storefront::routes;
use byte_mtaani_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Client options for the configured DSN, or `None` when error tracking is off.
fn sentry_options(config: &StorefrontConfig) -> Option<sentry::ClientOptions> {
    let dsn = config.sentry_dsn.as_deref()?.parse().ok()?;

    Some(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        before_send: Some(std::sync::Arc::new(strip_session_cookie)),
        ..Default::default()
    })
}

/// The session cookie identifies a visitor's cart; keep it out of reports.
fn strip_session_cookie(
    mut event: sentry::protocol::Event<'static>,
) -> Option<sentry::protocol::Event<'static>> {
    if let Some(request) = event.request.as_mut() {
        request.cookies = None;
        request
            .headers
            .retain(|name, _| !name.eq_ignore_ascii_case("cookie"));
    }
    Some(event)
}

/// Catalog fallbacks and malformed carts are expected degradations and log at
/// `warn`; only errors become Sentry events.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber: env filter, text or JSON output, Sentry.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "byte_mtaani_storefront=info,tower_http=debug".into());

    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber
    let sentry_options = sentry_options(&config);
    let error_tracking = sentry_options.is_some();
    let _sentry_guard = sentry_options.map(sentry::init);

    init_tracing(config.log_format);
    tracing::info!(error_tracking, "Error tracking configured");
    tracing::info!(catalog = %config.catalog.base_url, "Catalog API configured");

    let state = AppState::new(config.clone()).expect("Failed to initialize application state");

    let app = routes::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
///
/// If a handler cannot be installed that source is ignored and the server
/// keeps running until the other one fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupted, draining open requests"),
        () = terminate => tracing::info!("Terminated, draining open requests"),
    }
}
