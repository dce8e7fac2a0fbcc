//! HTTP server for aivis
//!
//! Serves the single-page UI, the check API and the checkout flow on top of
//! aivis-core.

pub mod checkout;
pub mod config;
pub mod error;
pub mod handlers;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use aivis_core::{Analyzer, HttpFetcher, PageFetcher};
use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use checkout::{CheckoutProvider, PaymentLinkCheckout, SandboxCheckout};
use config::ServerConfig;
use error::ApiError;

/// Headroom on top of the fetch budget before a request is abandoned
const REQUEST_GRACE: Duration = Duration::from_secs(5);

/// Shared state, cloned for each request
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub analyzer: Analyzer<'static>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        checkout: Arc<dyn CheckoutProvider>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            checkout,
            analyzer: Analyzer::default().with_timeout(fetch_timeout),
            request_timeout: fetch_timeout + REQUEST_GRACE,
        }
    }

    /// Production wiring: reqwest fetcher plus the configured checkout.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch_config())?;
        let checkout: Arc<dyn CheckoutProvider> = match &config.payment_link {
            Some(link) => Arc::new(PaymentLinkCheckout::new(link.clone())),
            None => Arc::new(SandboxCheckout),
        };
        Ok(Self::new(Arc::new(fetcher), checkout, config.fetch_timeout))
    }
}

/// Build the application router.
///
/// # Routes
/// - `GET /` - Web UI
/// - `GET|POST /api/check` - Run an analysis
/// - `POST /api/pay` - Start a checkout session
/// - `POST /api/session` - Session stub
/// - `GET /success` - Payment confirmation page
/// - `GET /health` - Liveness check
pub fn app(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/check",
            get(handlers::check_get).post(handlers::check_post),
        )
        .route("/api/pay", post(handlers::pay))
        .route("/api/session", post(handlers::session))
        .route("/success", get(handlers::success))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a panicked request into the generic analysis failure.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Analysis(format!("request handler panicked: {}", detail)).into_response()
}

/// Log filter from `RUST_LOG`, or `default` when it is unset or invalid.
pub fn log_filter(rust_log: Option<&str>, default: &str) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

#[cfg(test)]
mod tests;
