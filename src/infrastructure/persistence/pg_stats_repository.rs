//! PostgreSQL implementation of statistics repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Click, ClickStats, DayCount, NameCount, NewClick};
use crate::domain::repositories::{ServiceTotals, StatsRepository};
use crate::error::AppError;

#[derive(FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    referer: Option<String>,
    ip: Option<String>,
}

#[derive(FromRow)]
struct TotalsRow {
    total_clicks: i64,
    unique_clicks: i64,
}

#[derive(FromRow)]
struct DayRow {
    day: NaiveDate,
    count: i64,
}

#[derive(FromRow)]
struct ReferrerRow {
    name: String,
    count: i64,
}

#[derive(FromRow)]
struct ServiceTotalsRow {
    links: i64,
    active_links: i64,
    clicks: i64,
}

/// PostgreSQL repository for click tracking and analytics.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO link_clicks (link_id, user_agent, referer, ip)
            VALUES ($1, $2, $3, $4)
            RETURNING id, link_id, clicked_at, user_agent, referer, ip
            "#,
        )
        .bind(new_click.link_id)
        .bind(&new_click.user_agent)
        .bind(&new_click.referer)
        .bind(&new_click.ip)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            // 23503: the link was deleted between redirect and recording
            if let sqlx::Error::Database(db) = &e
                && db.code().as_deref() == Some("23503")
            {
                return AppError::bad_request(
                    "Link no longer exists",
                    serde_json::json!({ "link_id": new_click.link_id }),
                );
            }
            AppError::from(e)
        })?;

        Ok(Click::new(
            row.id,
            row.link_id,
            row.clicked_at,
            row.user_agent,
            row.referer,
            row.ip,
        ))
    }

    async fn link_stats(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
        top_referrers: i64,
    ) -> Result<ClickStats, AppError> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT COUNT(*) AS total_clicks, COUNT(DISTINCT ip) AS unique_clicks
            FROM link_clicks
            WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let days = sqlx::query_as::<_, DayRow>(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        let referrers = sqlx::query_as::<_, ReferrerRow>(
            r#"
            SELECT COALESCE(NULLIF(referer, ''), 'direct') AS name, COUNT(*) AS count
            FROM link_clicks
            WHERE link_id = $1
            GROUP BY name
            ORDER BY count DESC, name
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(top_referrers)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ClickStats {
            total_clicks: totals.total_clicks,
            unique_clicks: totals.unique_clicks,
            clicks_by_day: days
                .into_iter()
                .map(|r| DayCount {
                    date: r.day,
                    count: r.count,
                })
                .collect(),
            top_referrers: referrers
                .into_iter()
                .map(|r| NameCount {
                    name: r.name,
                    count: r.count,
                })
                .collect(),
        })
    }

    async fn totals(&self) -> Result<ServiceTotals, AppError> {
        let row = sqlx::query_as::<_, ServiceTotalsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM links) AS links,
                (SELECT COUNT(*) FROM links
                  WHERE is_active AND (expires_at IS NULL OR expires_at > NOW())) AS active_links,
                (SELECT COUNT(*) FROM link_clicks) AS clicks
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ServiceTotals {
            links: row.links,
            active_links: row.active_links,
            clicks: row.clicks,
        })
    }
}
