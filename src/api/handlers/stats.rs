//! Handler for per-link click statistics.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;
use crate::state::AppState;

/// Retrieves click statistics for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{code}/stats?days=N`
///
/// # Query Parameters
///
/// - `days` (optional): window of the per-day breakdown, clamped to 1..=365 (default: 30)
///
/// # Response
///
/// Total and unique clicks, clicks per UTC day within the window and the top 10
/// referrers. Requests without a referer are counted as `direct`.
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist or belongs to another token.
pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    Path(code): Path<String>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let report = state
        .stats_service
        .link_stats(Some(token.id), &code, params.days)
        .await?;

    Ok(Json(report.into()))
}
