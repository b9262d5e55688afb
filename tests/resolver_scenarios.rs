//! End-to-end resolution behaviour over the in-memory store and cache.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use shortly::application::services::{LinkService, MutationHooks, ResolveSource, Resolver};
use shortly::domain::click_worker::persist_click;
use shortly::domain::entities::LinkPatch;
use shortly::domain::repositories::LinkRepository;
use shortly::domain::resolution::ResolveError;
use shortly::infrastructure::cache::MemoryCache;
use shortly::infrastructure::memory::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    store: MemoryStore,
    cache: MemoryCache,
    resolver: Resolver<MemoryStore>,
    links: LinkService<MemoryStore>,
}

fn harness(timeout: Duration) -> Harness {
    let store = MemoryStore::new();
    let cache = MemoryCache::default();
    let resolver = Resolver::new(Arc::new(store.clone()), Arc::new(cache.clone()), timeout);
    let links = LinkService::new(
        Arc::new(store.clone()),
        MutationHooks::new(Arc::new(cache.clone())),
        7,
    );

    Harness {
        store,
        cache,
        resolver,
        links,
    }
}

#[tokio::test]
async fn test_deactivation_defeats_cached_redirect() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "abc123", "https://example.com").await;

    // First resolve misses and populates the cache.
    let first = h.resolver.resolve("abc123").await.unwrap();
    assert_eq!(first.destination_url, "https://example.com");
    assert_eq!(first.source, ResolveSource::Store);
    assert_eq!(
        h.cache.peek("abc123").await.as_deref(),
        Some("https://example.com")
    );

    // Deactivate behind the cache's back so the entry is still there.
    h.store
        .update("abc123", None, LinkPatch::deactivate())
        .await
        .unwrap();
    assert!(h.cache.peek("abc123").await.is_some());

    // Second resolve hits, the store refutes it and the entry is evicted.
    let second = h.resolver.resolve("abc123").await;
    assert_eq!(second.unwrap_err(), ResolveError::LinkDisabled);
    assert!(h.cache.peek("abc123").await.is_none());

    // Third resolve misses; the disabled link is not cached again.
    let third = h.resolver.resolve("abc123").await;
    assert_eq!(third.unwrap_err(), ResolveError::LinkDisabled);
    assert!(h.cache.peek("abc123").await.is_none());
}

#[tokio::test]
async fn test_cache_hit_is_corroborated() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "hit001", "https://example.com/a").await;

    h.resolver.resolve("hit001").await.unwrap();
    let resolved = h.resolver.resolve("hit001").await.unwrap();

    assert_eq!(resolved.source, ResolveSource::Cache);
    assert_eq!(resolved.destination_url, "https://example.com/a");
}

#[tokio::test]
async fn test_expired_link_with_cached_entry_is_gone() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "exp001", "https://example.com").await;
    h.resolver.resolve("exp001").await.unwrap();

    let past = Utc::now() - ChronoDuration::minutes(1);
    h.store
        .update(
            "exp001",
            None,
            LinkPatch {
                expires_at: Some(Some(past)),
                ..LinkPatch::default()
            },
        )
        .await
        .unwrap();

    let result = h.resolver.resolve("exp001").await;
    assert_eq!(result.unwrap_err(), ResolveError::LinkExpired);
    assert!(h.cache.peek("exp001").await.is_none());
}

#[tokio::test]
async fn test_deleted_link_with_cached_entry_is_not_found() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "del001", "https://example.com").await;
    h.resolver.resolve("del001").await.unwrap();

    h.store.delete("del001", None).await.unwrap();

    let result = h.resolver.resolve("del001").await;
    assert_eq!(result.unwrap_err(), ResolveError::NotFound);
    assert!(h.cache.peek("del001").await.is_none());
}

#[tokio::test]
async fn test_click_limit_counts_recorded_clicks() {
    let h = harness(Duration::from_secs(2));
    let link =
        common::insert_link_with(&h.store, "lim001", "https://example.com", None, Some(2)).await;

    for _ in 0..2 {
        let resolved = h.resolver.resolve("lim001").await.unwrap();
        let event = shortly::domain::click_event::ClickEvent::new(
            resolved.link_id,
            "lim001".to_string(),
            Some("10.0.0.1".to_string()),
            None,
            None,
        );
        assert!(persist_click(&h.store, event).await);
    }

    assert_eq!(h.store.count_clicks(link.id).await.unwrap(), 2);
    assert!(h.cache.peek("lim001").await.is_some());

    let result = h.resolver.resolve("lim001").await;
    assert_eq!(result.unwrap_err(), ResolveError::ClickLimitReached);
    assert!(h.cache.peek("lim001").await.is_none());
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_store() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "out001", "https://example.com").await;
    h.cache.set_unavailable(true);

    let resolved = h.resolver.resolve("out001").await.unwrap();
    assert_eq!(resolved.source, ResolveSource::Store);
    assert_eq!(resolved.destination_url, "https://example.com");

    h.cache.set_unavailable(false);
    assert!(h.cache.peek("out001").await.is_none());
}

#[tokio::test]
async fn test_store_outage_is_unavailable_even_on_cache_hit() {
    let h = harness(Duration::from_secs(2));
    common::insert_link(&h.store, "dbx001", "https://example.com").await;
    h.resolver.resolve("dbx001").await.unwrap();

    h.store.set_unavailable(true);

    let result = h.resolver.resolve("dbx001").await;
    assert_eq!(result.unwrap_err(), ResolveError::StoreUnavailable);
    // Nothing was learned about the link, so the entry stays.
    assert!(h.cache.peek("dbx001").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_without_caching() {
    let h = harness(Duration::from_millis(50));
    common::insert_link(&h.store, "slow01", "https://example.com").await;
    h.store
        .set_lookup_delay(Some(Duration::from_millis(500)))
        .await;

    let result = h.resolver.resolve("slow01").await;
    assert_eq!(result.unwrap_err(), ResolveError::StoreUnavailable);
    assert!(h.cache.peek("slow01").await.is_none());

    h.store.set_lookup_delay(None).await;
    assert!(h.resolver.resolve("slow01").await.is_ok());
}

#[tokio::test]
async fn test_reactivation_through_service_restores_redirect() {
    let h = harness(Duration::from_secs(2));
    let link = h
        .links
        .create(
            Some(1),
            shortly::application::services::CreateLink {
                url: "https://example.com/page".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Creation warms the cache.
    assert_eq!(
        h.cache.peek(&link.code).await.as_deref(),
        Some("https://example.com/page")
    );

    h.links.deactivate(Some(1), &link.code).await.unwrap();
    assert!(h.cache.peek(&link.code).await.is_none());
    assert_eq!(
        h.resolver.resolve(&link.code).await.unwrap_err(),
        ResolveError::LinkDisabled
    );

    h.links
        .update(
            Some(1),
            &link.code,
            LinkPatch {
                is_active: Some(true),
                ..LinkPatch::default()
            },
        )
        .await
        .unwrap();

    let resolved = h.resolver.resolve(&link.code).await.unwrap();
    assert_eq!(resolved.destination_url, "https://example.com/page");
}
