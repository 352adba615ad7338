//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, changes, health, pages, raffle};
use crate::state::AppState;

/// Maximum concurrent requests for the JSON API.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Pages
/// - `GET /` - Public raffle page
/// - `GET /admin` - Admin page
///
/// ## Public API
/// - `GET /api/raffle` - List entries ordered by slot
/// - `POST /api/raffle` - Reserve one slot
/// - `POST /api/raffle/batch` - Reserve several slots atomically
/// - `GET /api/raffle/info` - Price and payment instructions
/// - `GET /api/raffle/changes` - Change feed (SSE)
///
/// ## Admin API (PIN or session token)
/// - `POST /api/admin/session` - Exchange the PIN for a session token
/// - `POST /api/admin/confirm` - Mark a slot paid
/// - `POST /api/admin/unreserve` - Release a slot
/// - `POST /api/admin/reset` - Remove every entry
///
/// ## Health
/// - `GET /health`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route(
            "/raffle",
            get(raffle::list_entries).post(raffle::create_entry),
        )
        .route("/raffle/batch", post(raffle::create_batch))
        .route("/raffle/info", get(raffle::payment_info))
        .route("/admin/session", post(admin::create_session))
        .route("/admin/confirm", post(admin::confirm_payment))
        .route("/admin/unreserve", post(admin::unreserve))
        .route("/admin/reset", post(admin::reset))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Pages
        .route("/", get(pages::public_page))
        .route("/admin", get(pages::admin_page))
        .route("/health", get(health::health))
        // Long-lived stream, kept out of the concurrency limit
        .route("/api/raffle/changes", get(changes::stream_changes))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
