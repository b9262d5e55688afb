//! In-memory store.
//!
//! Implements every repository trait over one shared state. Contents are lost on
//! shutdown. Used by the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::entities::{
    Click, ClickStats, DayCount, Link, LinkPatch, LinkValidity, NameCount, NewClick, NewLink,
};
use crate::domain::repositories::{
    ApiToken, LinkRepository, ServiceTotals, StatsRepository, TokenRepository,
};
use crate::error::AppError;

#[derive(Default)]
struct State {
    links: HashMap<String, Link>,
    clicks: Vec<Click>,
    tokens: Vec<ApiToken>,
    next_link_id: i64,
    next_click_id: i64,
}

/// An in-memory link, click and token store.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    unavailable: Arc<AtomicBool>,
    lookup_delay: Arc<Mutex<Option<Duration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with [`AppError::Unavailable`] while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays the lookups used by redirects.
    pub async fn set_lookup_delay(&self, delay: Option<Duration>) {
        *self.lookup_delay.lock().await = delay;
    }

    /// Records a click with an explicit timestamp.
    pub async fn record_click_at(
        &self,
        new_click: NewClick,
        clicked_at: DateTime<Utc>,
    ) -> Result<Click, AppError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        if !state.links.values().any(|l| l.id == new_click.link_id) {
            return Err(AppError::bad_request(
                "Link no longer exists",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        state.next_click_id += 1;
        let click = Click::new(
            state.next_click_id,
            new_click.link_id,
            clicked_at,
            new_click.user_agent,
            new_click.referer,
            new_click.ip,
        );
        state.clicks.push(click.clone());
        Ok(click)
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::unavailable(
                "Store unavailable",
                json!({ "backend": "memory" }),
            ));
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        let delay = *self.lookup_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn owned_by(link: &Link, owner_id: Option<i64>) -> bool {
    owner_id.is_none_or(|owner| link.owner_id == Some(owner))
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        if state.links.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Short code already taken",
                json!({ "code": new_link.code }),
            ));
        }

        state.next_link_id += 1;
        let now = Utc::now();
        let link = Link {
            id: state.next_link_id,
            code: new_link.code,
            destination_url: new_link.destination_url,
            title: new_link.title,
            owner_id: new_link.owner_id,
            is_active: true,
            expires_at: new_link.expires_at,
            max_clicks: new_link.max_clicks,
            password_hash: new_link.password_hash,
            tags: new_link.tags,
            created_at: now,
            updated_at: now,
        };
        state.links.insert(link.code.clone(), link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.simulate_latency().await;
        self.check_available()?;
        Ok(self.state.lock().await.links.get(code).cloned())
    }

    async fn get_validity_fields(&self, code: &str) -> Result<Option<LinkValidity>, AppError> {
        self.simulate_latency().await;
        self.check_available()?;
        let state = self.state.lock().await;

        Ok(state.links.get(code).map(|link| {
            let recorded = link.max_clicks.map(|_| {
                state.clicks.iter().filter(|c| c.link_id == link.id).count() as i64
            });
            link.validity(recorded)
        }))
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        self.check_available()?;
        Ok(self.state.lock().await.links.contains_key(code))
    }

    async fn update(
        &self,
        code: &str,
        owner_id: Option<i64>,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        match state.links.get_mut(code) {
            Some(link) if owned_by(link, owner_id) => {
                patch.apply(link);
                link.updated_at = Utc::now();
                Ok(Some(link.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        let link_id = match state.links.get(code) {
            Some(link) if owned_by(link, owner_id) => link.id,
            _ => return Ok(false),
        };
        state.links.remove(code);
        state.clicks.retain(|c| c.link_id != link_id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        self.record_click_at(new_click, Utc::now()).await
    }

    async fn link_stats(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
        top_referrers: i64,
    ) -> Result<ClickStats, AppError> {
        self.check_available()?;
        let state = self.state.lock().await;
        let clicks: Vec<&Click> = state.clicks.iter().filter(|c| c.link_id == link_id).collect();

        let unique: HashSet<Option<&str>> = clicks.iter().map(|c| c.ip.as_deref()).collect();
        // COUNT(DISTINCT ip) ignores NULLs
        let unique_clicks = unique.iter().filter(|ip| ip.is_some()).count() as i64;

        let mut by_day: BTreeMap<_, i64> = BTreeMap::new();
        for click in clicks.iter().filter(|c| c.clicked_at >= since) {
            *by_day.entry(click.clicked_at.date_naive()).or_default() += 1;
        }

        let mut referrers: HashMap<String, i64> = HashMap::new();
        for click in &clicks {
            let name = match click.referer.as_deref() {
                Some(r) if !r.is_empty() => r.to_string(),
                _ => "direct".to_string(),
            };
            *referrers.entry(name).or_default() += 1;
        }
        let mut top: Vec<NameCount> = referrers
            .into_iter()
            .map(|(name, count)| NameCount { name, count })
            .collect();
        top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top.truncate(top_referrers.max(0) as usize);

        Ok(ClickStats {
            total_clicks: clicks.len() as i64,
            unique_clicks,
            clicks_by_day: by_day
                .into_iter()
                .map(|(date, count)| DayCount { date, count })
                .collect(),
            top_referrers: top,
        })
    }

    async fn totals(&self) -> Result<ServiceTotals, AppError> {
        self.check_available()?;
        let state = self.state.lock().await;
        let now = Utc::now();

        Ok(ServiceTotals {
            links: state.links.len() as i64,
            active_links: state
                .links
                .values()
                .filter(|l| l.is_active && l.expires_at.is_none_or(|e| e > now))
                .count() as i64,
            clicks: state.clicks.len() as i64,
        })
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .cloned())
    }

    async fn update_last_used(&self, _token_hash: &str) -> Result<(), AppError> {
        self.check_available()
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        if state
            .tokens
            .iter()
            .any(|t| t.name == name || t.token_hash == token_hash)
        {
            return Err(AppError::conflict(
                "Token already exists",
                json!({ "name": name }),
            ));
        }

        let token = ApiToken {
            id: state.tokens.len() as i64 + 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        };
        state.tokens.push(token.clone());
        Ok(token)
    }
}
