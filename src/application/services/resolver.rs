//! Redirect resolution with a corroborated cache-aside lookup.
//!
//! A cache hit is never trusted on its own: the store is asked for the
//! lightweight validity fields of the code before the cached URL is served.
//! Cache writes happen only after the lookup phase completed inside the
//! timeout, so an aborted call leaves the cache untouched.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::domain::resolution::{Decision, Observation, ResolveError, decide};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Where the destination URL of a successful resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveSource {
    Cache,
    Store,
}

impl ResolveSource {
    fn as_str(self) -> &'static str {
        match self {
            ResolveSource::Cache => "cache_hit",
            ResolveSource::Store => "cache_miss",
        }
    }
}

/// A successful resolution.
///
/// A `password_protected` link passed the resolvability predicate but must be
/// unlocked before its destination is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub link_id: i64,
    pub destination_url: String,
    pub password_protected: bool,
    pub source: ResolveSource,
}

pub struct Resolver<L: LinkRepository + ?Sized> {
    links: Arc<L>,
    cache: Arc<dyn CacheService>,
    timeout: Duration,
}

impl<L: LinkRepository + ?Sized> Resolver<L> {
    /// Creates a resolver.
    ///
    /// `timeout` bounds the cache read and store reads of one call.
    pub fn new(links: Arc<L>, cache: Arc<dyn CacheService>, timeout: Duration) -> Self {
        Self {
            links,
            cache,
            timeout,
        }
    }

    /// Resolves `code` to its destination URL and link id.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] if no link has this code
    /// - [`ResolveError::LinkDisabled`], [`ResolveError::LinkExpired`] or
    ///   [`ResolveError::ClickLimitReached`] if the link exists but may not redirect
    /// - [`ResolveError::StoreUnavailable`] if the store failed or the lookup timed out
    pub async fn resolve(&self, code: &str) -> Result<Resolved, ResolveError> {
        let observation = match tokio::time::timeout(self.timeout, self.observe(code)).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => {
                warn!(code, error = %e, "Link store lookup failed");
                return Self::record(Err(ResolveError::StoreUnavailable));
            }
            Err(_) => {
                warn!(
                    code,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Link store lookup timed out"
                );
                return Self::record(Err(ResolveError::StoreUnavailable));
            }
        };

        let source = match observation {
            Observation::Cached { .. } => ResolveSource::Cache,
            Observation::Stored { .. } => ResolveSource::Store,
        };

        let decision = decide(observation, Utc::now());

        match &decision {
            Decision::StaleHit(reason) => {
                debug!(code, reason = reason.as_str(), "Evicting refuted cache entry");
                metrics::counter!("shortly_cache_evictions_total").increment(1);
                if let Err(e) = self.cache.invalidate(code).await {
                    warn!(code, error = %e, "Failed to evict stale cache entry");
                }
            }
            Decision::MissResolvable {
                destination_url, ..
            } => {
                if let Err(e) = self.cache.set_url(code, destination_url, None).await {
                    warn!(code, error = %e, "Failed to populate cache");
                }
            }
            Decision::Hit { .. } | Decision::MissUnresolvable(_) => {}
        }

        let result = decision.outcome().map(|target| Resolved {
            link_id: target.link_id,
            destination_url: target.destination_url.to_string(),
            password_protected: target.password_protected,
            source,
        });

        Self::record(result)
    }

    async fn observe(&self, code: &str) -> Result<Observation, AppError> {
        let cached = match self.cache.get_url(code).await {
            Ok(cached) => cached,
            Err(e) => {
                // an unreachable cache degrades to store-only resolution
                warn!(code, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        if let Some(url) = cached {
            let validity = self.links.get_validity_fields(code).await?;
            return Ok(Observation::Cached { url, validity });
        }

        let link = self.links.find_by_code(code).await?;
        let recorded_clicks = match &link {
            Some(link) if link.max_clicks.is_some() => {
                Some(self.links.count_clicks(link.id).await?)
            }
            _ => None,
        };

        Ok(Observation::Stored {
            link,
            recorded_clicks,
        })
    }

    fn record(result: Result<Resolved, ResolveError>) -> Result<Resolved, ResolveError> {
        let outcome = match &result {
            Ok(resolved) => resolved.source.as_str(),
            Err(e) => e.as_str(),
        };
        metrics::counter!("shortly_resolve_total", "outcome" => outcome).increment(1);
        result
    }
}
