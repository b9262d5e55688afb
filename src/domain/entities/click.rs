//! Click entity representing a single successful redirect.

use chrono::{DateTime, NaiveDate, Utc};

/// A click recorded when a short link was resolved.
///
/// Clicks are append-only. They disappear only when their link is deleted.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        id: i64,
        link_id: i64,
        clicked_at: DateTime<Utc>,
        user_agent: Option<String>,
        referer: Option<String>,
        ip: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            user_agent,
            referer,
            ip,
        }
    }
}

/// Input data for recording a new click event.
///
/// The timestamp is set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

/// Aggregated click analytics for one link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickStats {
    pub total_clicks: i64,
    /// Distinct client IPs.
    pub unique_clicks: i64,
    pub clicks_by_day: Vec<DayCount>,
    pub top_referrers: Vec<NameCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCount {
    pub name: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_creation_minimal() {
        let now = Utc::now();
        let click = Click::new(1, 10, now, None, None, None);

        assert_eq!(click.link_id, 10);
        assert_eq!(click.clicked_at, now);
        assert!(click.user_agent.is_none());
        assert!(click.referer.is_none());
        assert!(click.ip.is_none());
    }

    #[test]
    fn test_empty_stats() {
        let stats = ClickStats::default();
        assert_eq!(stats.total_clicks, 0);
        assert!(stats.clicks_by_day.is_empty());
    }
}
