//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    bulk_create_handler, create_link_handler, deactivate_link_handler, delete_link_handler,
    get_link_handler, stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes. Authentication is layered on by the caller.
///
/// # Endpoints
///
/// - `POST   /links`                   - Create a short link
/// - `POST   /links/bulk`              - Create up to 50 short links
/// - `GET    /links/{code}`            - Link details with click count
/// - `PATCH  /links/{code}`            - Partially update a link
/// - `DELETE /links/{code}`            - Delete a link and its clicks
/// - `POST   /links/{code}/deactivate` - Disable a link
/// - `GET    /links/{code}/stats`      - Click statistics (`?days=N`)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/bulk", post(bulk_create_handler))
        .route(
            "/links/{code}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{code}/deactivate", post(deactivate_link_handler))
        .route("/links/{code}/stats", get(stats_handler))
}
