//! Handlers for link management endpoints.
//!
//! Every handler runs behind [`crate::api::middleware::auth`], which puts the
//! authenticated [`ApiToken`] into the request extensions. The token id is the
//! owner of the links it creates, and a token only sees its own links.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    BatchSummary, BulkCreateRequest, BulkCreateResponse, BulkResultItem, CreateLinkRequest,
    LinkResponse, UpdateLinkRequest,
};
use crate::application::services::link_service::{CreateLink, short_url};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "custom_code": "my-link",   // optional, 3-20 of [A-Za-z0-9_-]
///   "title": "Landing page",    // optional
///   "expires_in_days": 30,      // optional, or "expires_at"
///   "max_clicks": 100,          // optional
///   "password": "s3cret",       // optional, 4-128 characters
///   "tags": ["docs", "launch"]  // optional, at most 10
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the custom code is taken
/// - 503 Service Unavailable if no free code was found
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create(Some(token.id), payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url)),
    ))
}

/// Creates up to 50 short links in one request.
///
/// # Endpoint
///
/// `POST /api/links/bulk`
///
/// Items are processed independently. If one fails, the others continue and the
/// failure is reported in its slot of the `items` array. An empty batch or one
/// with more than 50 items is rejected as a whole.
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 2, "successful": 1, "failed": 1 },
///   "items": [
///     { "url": "https://example.com", "code": "aB3xY9k", "short_url": "http://localhost:8080/aB3xY9k" },
///     { "url": "ftp://nope", "error": { "code": "validation_error", "message": "...", "details": {} } }
///   ]
/// }
/// ```
pub async fn bulk_create_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Json(payload): Json<BulkCreateRequest>,
) -> Result<Json<BulkCreateResponse>, AppError> {
    let urls: Vec<String> = payload.links.iter().map(|l| l.url.clone()).collect();
    let inputs = payload.links.into_iter().map(CreateLink::from).collect();

    let results = state
        .link_service
        .create_bulk(Some(token.id), inputs)
        .await?;

    let items: Vec<BulkResultItem> = urls
        .into_iter()
        .zip(results)
        .map(|(url, result)| match result {
            Ok(link) => BulkResultItem::Success {
                url,
                short_url: short_url(&state.base_url, &link.code),
                code: link.code,
            },
            Err(err) => BulkResultItem::Error {
                url,
                error: err.to_error_info(),
            },
        })
        .collect();

    let successful = items
        .iter()
        .filter(|i| matches!(i, BulkResultItem::Success { .. }))
        .count();

    Ok(Json(BulkCreateResponse {
        summary: BatchSummary {
            total: items.len(),
            successful,
            failed: items.len() - successful,
        },
        items,
    }))
}

/// Returns a link with its current click count.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let details = state.link_service.get(Some(token.id), &code).await?;

    Ok(Json(LinkResponse::from_details(details, &state.base_url)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
///
/// # Request Body
///
/// All fields are optional. Only provided fields are changed; `null` clears
/// `title`, `expires_at` or `max_clicks`.
///
/// ```json
/// {
///   "title": "New title",
///   "is_active": true,
///   "expires_at": null,
///   "max_clicks": 500
/// }
/// ```
///
/// The cached redirect is evicted, so the change applies to the next request.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Path(code): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state
        .link_service
        .update(Some(token.id), &code, payload.into())
        .await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Disables a link. Redirects answer 410 Gone afterwards.
///
/// # Endpoint
///
/// `POST /api/links/{code}/deactivate`
pub async fn deactivate_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.deactivate(Some(token.id), &code).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Deletes a link and its recorded clicks.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Response
///
/// 204 No Content on success.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(Some(token.id), &code).await?;

    Ok(StatusCode::NO_CONTENT)
}
