//! Click statistics and analytics service.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{ClickStats, Link};
use crate::domain::repositories::{LinkRepository, ServiceTotals, StatsRepository};
use crate::error::AppError;

pub const DEFAULT_STATS_DAYS: i64 = 30;
pub const MAX_STATS_DAYS: i64 = 365;
const TOP_REFERRERS: i64 = 10;

/// Statistics for one link over a window of days.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStatsReport {
    pub link: Link,
    pub days: i64,
    pub stats: ClickStats,
}

/// Service for retrieving click statistics.
pub struct StatsService<L: LinkRepository + ?Sized, S: StatsRepository + ?Sized> {
    links: Arc<L>,
    stats: Arc<S>,
}

impl<L, S> StatsService<L, S>
where
    L: LinkRepository + ?Sized,
    S: StatsRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(links: Arc<L>, stats: Arc<S>) -> Self {
        Self { links, stats }
    }

    /// Aggregates the clicks of one link.
    ///
    /// `days` defaults to 30 and is clamped to `1..=365`. Only `clicks_by_day`
    /// is limited to the window.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link visible to `owner` has this code.
    pub async fn link_stats(
        &self,
        owner: Option<i64>,
        code: &str,
        days: Option<i64>,
    ) -> Result<LinkStatsReport, AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .filter(|link| owner.is_none_or(|o| link.owner_id == Some(o)))
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let days = days.unwrap_or(DEFAULT_STATS_DAYS).clamp(1, MAX_STATS_DAYS);
        let since = Utc::now() - Duration::days(days);

        let stats = self
            .stats
            .link_stats(link.id, since, TOP_REFERRERS)
            .await?;

        Ok(LinkStatsReport { link, days, stats })
    }

    /// Counts links and clicks across the service.
    pub async fn totals(&self) -> Result<ServiceTotals, AppError> {
        self.stats.totals().await
    }
}
