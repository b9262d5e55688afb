//! Handlers for short URL redirects and password unlocks.

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::api::dto::links::{UnlockRequest, UnlockResponse};
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code (cache hit corroborated by the store, or store lookup)
/// 2. Send click event to background worker
/// 3. Return 307 Temporary Redirect
///
/// A permanent redirect is never used: browsers would cache it and keep
/// redirecting after the link is deactivated.
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full or closed, the click is dropped with a warning.
///
/// # Errors
///
/// - 403 Forbidden if the link is password protected
/// - 404 Not Found if the code doesn't exist
/// - 410 Gone if the link is disabled, expired or out of clicks
/// - 503 Service Unavailable if the link store can't be reached in time
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = state.resolver.resolve(&code).await?;
    debug!(code = %code, source = ?resolved.source, "Resolved short link");

    if resolved.password_protected {
        return Err(AppError::forbidden(
            "password_required",
            "Link is password protected",
            json!({ "unlock": format!("/{code}/unlock") }),
        ));
    }

    enqueue_click(&state, resolved.link_id, code, &headers, addr);

    Ok(Redirect::temporary(&resolved.destination_url))
}

/// Opens a password-protected link.
///
/// # Endpoint
///
/// `POST /{code}/unlock`
///
/// # Request Body
///
/// ```json
/// { "password": "s3cret" }
/// ```
///
/// # Response
///
/// ```json
/// { "url": "https://example.com/page" }
/// ```
///
/// The link must be resolvable, exactly as for a redirect. A successful unlock
/// counts as a click. Links without a password unlock with any password.
///
/// # Errors
///
/// - 403 Forbidden if the password is wrong
/// - 404, 410 and 503 as for `GET /{code}`
pub async fn unlock_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, AppError> {
    let resolved = state.resolver.resolve(&code).await?;

    if resolved.password_protected {
        state
            .link_service
            .check_password(&code, &payload.password)
            .await?;
    }

    enqueue_click(&state, resolved.link_id, code, &headers, addr);

    Ok(Json(UnlockResponse {
        url: resolved.destination_url,
    }))
}

/// Hands a click to the background worker. A full or closed queue drops it.
fn enqueue_click(
    state: &AppState,
    link_id: i64,
    code: String,
    headers: &HeaderMap,
    addr: SocketAddr,
) {
    let click_event = ClickEvent::new(
        link_id,
        code,
        client_ip(headers, Some(addr), state.behind_proxy),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    if let Err(e) = state.click_sender.try_send(click_event) {
        let (reason, event) = match e {
            TrySendError::Full(event) => ("queue full", event),
            TrySendError::Closed(event) => ("queue closed", event),
        };
        metrics::counter!("shortly_clicks_dropped_total").increment(1);
        warn!(code = %event.code, reason, "Click dropped");
    }
}
