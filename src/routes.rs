//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`        - Short link redirect (public)
//! - `POST /{code}/unlock` - Password-protected link unlock (public, rate limited)
//! - `GET  /health`      - Health check: DB, cache, click queue (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the API and on unlocks (configurable for proxy deployments)
//! - **Authentication** - Bearer token on the API
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, unlock_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_governor::key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the router with all routes and middleware except path normalization.
///
/// Requests must carry `ConnectInfo<SocketAddr>`; the redirect handler and the
/// rate limiter read the peer address from it.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn router(state: AppState, behind_proxy: bool) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let unlock_router = Router::new().route("/{code}/unlock", post(unlock_handler));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(rate_limited(unlock_router, behind_proxy))
        .nest("/api", rate_limited(api_router, behind_proxy))
        .with_state(state)
        .layer(tracing::layer())
}

fn rate_limited(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        router.layer(rate_limit::secure_layer(SmartIpKeyExtractor))
    } else {
        router.layer(rate_limit::secure_layer(PeerIpKeyExtractor))
    }
}

/// Constructs the application router, trimming trailing slashes before routing.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, behind_proxy))
}
