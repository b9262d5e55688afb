//! PostgreSQL implementation of the Link Store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPatch, LinkValidity, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, code, destination_url, title, owner_id, is_active, \
                            expires_at, max_clicks, password_hash, created_at, updated_at, \
                            ARRAY(SELECT tag FROM link_tags WHERE link_id = links.id ORDER BY tag) AS tags";

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    destination_url: String,
    title: Option<String>,
    owner_id: Option<i64>,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    max_clicks: Option<i64>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tags: Vec<String>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            code: r.code,
            destination_url: r.destination_url,
            title: r.title,
            owner_id: r.owner_id,
            is_active: r.is_active,
            expires_at: r.expires_at,
            max_clicks: r.max_clicks,
            password_hash: r.password_hash,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ValidityRow {
    id: i64,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    max_clicks: Option<i64>,
    recorded_clicks: Option<i64>,
    password_protected: bool,
}

/// PostgreSQL repository for links.
///
/// Uses bound parameters for every value. Code uniqueness is enforced by the
/// `idx_links_code` unique index. Tags live in `link_tags` and are read back
/// sorted with every link.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;

        let link_id: i64 = sqlx::query_scalar(
            "INSERT INTO links (code, destination_url, title, owner_id, expires_at, max_clicks, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(&new_link.code)
        .bind(&new_link.destination_url)
        .bind(&new_link.title)
        .bind(new_link.owner_id)
        .bind(new_link.expires_at)
        .bind(new_link.max_clicks)
        .bind(&new_link.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "Short code already taken",
                json!({ "code": new_link.code }),
            ),
            other => other,
        })?;

        if !new_link.tags.is_empty() {
            sqlx::query(
                "INSERT INTO link_tags (link_id, tag) \
                 SELECT $1, UNNEST($2::varchar[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(link_id)
            .bind(&new_link.tags)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn get_validity_fields(&self, code: &str) -> Result<Option<LinkValidity>, AppError> {
        // The click count subquery only runs for click-limited links.
        let row = sqlx::query_as::<_, ValidityRow>(
            r#"
            SELECT
                l.id,
                l.is_active,
                l.expires_at,
                l.max_clicks,
                CASE WHEN l.max_clicks IS NULL THEN NULL
                     ELSE (SELECT COUNT(*) FROM link_clicks lc WHERE lc.link_id = l.id)
                END AS recorded_clicks,
                l.password_hash IS NOT NULL AS password_protected
            FROM links l
            WHERE l.code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| LinkValidity {
            link_id: r.id,
            is_active: r.is_active,
            expires_at: r.expires_at,
            max_clicks: r.max_clicks,
            recorded_clicks: r.recorded_clicks,
            password_protected: r.password_protected,
        }))
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn update(
        &self,
        code: &str,
        owner_id: Option<i64>,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE links SET updated_at = NOW()");

        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(is_active) = patch.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        if let Some(expires_at) = patch.expires_at {
            qb.push(", expires_at = ").push_bind(expires_at);
        }
        if let Some(max_clicks) = patch.max_clicks {
            qb.push(", max_clicks = ").push_bind(max_clicks);
        }

        qb.push(" WHERE code = ").push_bind(code.to_string());
        if let Some(owner_id) = owner_id {
            qb.push(" AND owner_id = ").push_bind(owner_id);
        }
        qb.push(" RETURNING ").push(LINK_COLUMNS);

        let row = qb
            .build_query_as::<LinkRow>()
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn delete(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM links WHERE code = $1 AND ($2::bigint IS NULL OR owner_id = $2)",
        )
        .bind(code)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
