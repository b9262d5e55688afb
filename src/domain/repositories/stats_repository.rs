//! Repository trait for click recording and analytics.

use crate::domain::entities::{Click, ClickStats, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Service-wide counters shown by the operator CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceTotals {
    pub links: i64,
    pub active_links: i64,
    pub clicks: i64,
}

/// Repository interface for click tracking and statistics.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Records a new click event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced link does not exist
    /// (for example, it was deleted after the redirect was served).
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Aggregates the clicks of one link recorded at or after `since`.
    ///
    /// `total_clicks` and `unique_clicks` cover the whole lifetime of the link;
    /// `clicks_by_day` covers the window only.
    async fn link_stats(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
        top_referrers: i64,
    ) -> Result<ClickStats, AppError>;

    /// Counts links and clicks across the service.
    async fn totals(&self) -> Result<ServiceTotals, AppError>;
}
