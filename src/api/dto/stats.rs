//! DTOs for link statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::services::LinkStatsReport;

/// Query parameters of `GET /api/links/{code}/stats`.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Window of `clicks_by_day`, clamped to 1..=365 (default 30).
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub code: String,
    pub destination_url: String,
    pub days: i64,
    pub total_clicks: i64,
    pub unique_clicks: i64,
    pub clicks_by_day: Vec<DailyClicks>,
    pub top_referrers: Vec<ReferrerClicks>,
}

#[derive(Debug, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct ReferrerClicks {
    pub referrer: String,
    pub clicks: i64,
}

impl From<LinkStatsReport> for StatsResponse {
    fn from(report: LinkStatsReport) -> Self {
        Self {
            code: report.link.code,
            destination_url: report.link.destination_url,
            days: report.days,
            total_clicks: report.stats.total_clicks,
            unique_clicks: report.stats.unique_clicks,
            clicks_by_day: report
                .stats
                .clicks_by_day
                .into_iter()
                .map(|d| DailyClicks {
                    date: d.date,
                    clicks: d.count,
                })
                .collect(),
            top_referrers: report
                .stats
                .top_referrers
                .into_iter()
                .map(|r| ReferrerClicks {
                    referrer: r.name,
                    clicks: r.count,
                })
                .collect(),
        }
    }
}
