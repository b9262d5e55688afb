//! In-process cache backed by moka.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;

use super::service::{CacheError, CacheResult, CacheService};

/// Upper bound on cached codes. Least recently used entries go first.
const MAX_ENTRIES: u64 = 100_000;

#[derive(Debug, Clone)]
struct Entry {
    url: String,
    ttl: Duration,
}

/// Expires each entry after its own TTL, restarting it on overwrite.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// A cache held in process memory.
///
/// Cloning shares the same entries, so a test can keep a handle and inspect what
/// the resolver wrote.
///
/// [`MemoryCache::set_unavailable`] makes every operation fail, which is how the
/// fail-open redirect path is exercised without a real Redis outage.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, Entry>,
    default_ttl: Duration,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .expire_after(PerEntryTtl)
                .build(),
            default_ttl: Duration::from_secs(default_ttl_seconds),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulates a cache outage (`true`) or recovery (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the live entry for `short_code`, bypassing the outage switch.
    pub async fn peek(&self, short_code: &str) -> Option<String> {
        self.entries.get(short_code).await.map(|e| e.url)
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError(
                "memory cache marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(86_400)
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        self.check_available()?;
        Ok(self.entries.get(short_code).await.map(|e| e.url))
    }

    async fn set_url(
        &self,
        short_code: &str,
        destination_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.check_available()?;

        let ttl = ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);

        self.entries
            .insert(
                short_code.to_string(),
                Entry {
                    url: destination_url.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.check_available()?;
        self.entries.invalidate(short_code).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
