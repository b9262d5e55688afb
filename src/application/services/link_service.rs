//! Link creation and management service.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::mutation_hooks::{LinkMutation, MutationHooks};
use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::url_validator::validate_destination_url;

/// Attempts at drawing a free random code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Largest accepted bulk request.
pub const MAX_BULK_ITEMS: usize = 50;

/// Matches the `links.title` column width.
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest relative expiry, about ten years.
pub const MAX_EXPIRES_IN_DAYS: i64 = 3650;

pub const MAX_TAGS: usize = 10;
/// Matches the `link_tags.tag` column width.
pub const MAX_TAG_CHARS: usize = 50;

/// Input for [`LinkService::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub url: String,
    pub custom_code: Option<String>,
    pub title: Option<String>,
    pub expires_in_days: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    /// Locks the link behind the unlock endpoint. An empty string means none.
    pub password: Option<String>,
    pub tags: Vec<String>,
}

/// A link with its recorded click count.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDetails {
    pub link: Link,
    pub click_count: i64,
}

/// Service for creating and managing short links.
///
/// `owner` is the id of the API token acting on the link. `None` means the
/// operator, who may act on every link. A link owned by someone else is
/// reported as not found.
///
/// Every mutation runs the matching [`MutationHooks`] once the store accepted it.
pub struct LinkService<L: LinkRepository + ?Sized> {
    links: Arc<L>,
    hooks: MutationHooks,
    code_length: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service generating codes of `code_length` characters.
    pub fn new(links: Arc<L>, hooks: MutationHooks, code_length: usize) -> Self {
        Self {
            links,
            hooks,
            code_length,
        }
    }

    /// Creates a short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - URL is not an absolute `http`/`https` URL with a host
    /// - Custom code is malformed or reserved
    /// - Both expiry forms are given, the expiry is not in the future, or
    ///   `expires_in_days` exceeds [`MAX_EXPIRES_IN_DAYS`]
    /// - `max_clicks` is below 1
    /// - The title, a tag or the password has an invalid length
    ///
    /// Returns [`AppError::Conflict`] if the custom code is taken.
    ///
    /// Returns [`AppError::CodeSpaceExhausted`] if no free random code was found.
    pub async fn create(&self, owner: Option<i64>, input: CreateLink) -> Result<Link, AppError> {
        let destination_url = validate_destination_url(&input.url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "url": input.url, "reason": e.to_string() }))
        })?;

        let expires_at = resolve_expiry(input.expires_in_days, input.expires_at, Utc::now())?;

        if let Some(max_clicks) = input.max_clicks
            && max_clicks < 1
        {
            return Err(AppError::bad_request(
                "max_clicks must be at least 1",
                json!({ "max_clicks": max_clicks }),
            ));
        }

        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        check_title(title.as_deref())?;

        let tags = normalize_tags(input.tags)?;

        let password_hash = match input.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(run_blocking(move || hash_password(&password)).await?),
            None => None,
        };

        let template = NewLink {
            code: String::new(),
            destination_url,
            title,
            owner_id: owner,
            expires_at,
            max_clicks: input.max_clicks,
            password_hash,
            tags,
        };

        let link = match input.custom_code {
            Some(custom) => {
                validate_custom_code(&custom)?;
                self.links
                    .create(NewLink {
                        code: custom,
                        ..template
                    })
                    .await?
            }
            None => self.create_with_generated_code(template).await?,
        };

        info!(code = %link.code, link_id = link.id, "Link created");

        self.hooks
            .after(LinkMutation::Created {
                code: &link.code,
                destination_url: &link.destination_url,
            })
            .await;

        Ok(link)
    }

    /// Creates several links. Each item succeeds or fails on its own.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `items` is empty or longer than
    /// [`MAX_BULK_ITEMS`]. Per-item failures are returned in the result vector.
    pub async fn create_bulk(
        &self,
        owner: Option<i64>,
        items: Vec<CreateLink>,
    ) -> Result<Vec<Result<Link, AppError>>, AppError> {
        if items.is_empty() || items.len() > MAX_BULK_ITEMS {
            return Err(AppError::bad_request(
                format!("Bulk requests take 1 to {MAX_BULK_ITEMS} links"),
                json!({ "count": items.len() }),
            ));
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.create(owner, item).await);
        }
        Ok(results)
    }

    /// Checks the password of a locked link. Links without a password accept any
    /// password.
    ///
    /// Resolvability is not checked here; callers resolve the code first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is gone and [`AppError::Forbidden`]
    /// if the password does not match.
    pub async fn check_password(&self, code: &str, password: &str) -> Result<(), AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))?;

        let Some(hash) = link.password_hash else {
            return Ok(());
        };

        let password = password.to_string();
        if run_blocking(move || verify_password(&password, &hash)).await? {
            Ok(())
        } else {
            warn!(code, "Wrong link password");
            Err(AppError::forbidden(
                "invalid_password",
                "Wrong password",
                json!({ "code": code }),
            ))
        }
    }

    /// Retrieves a link and its click count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link visible to `owner` has this code.
    pub async fn get(&self, owner: Option<i64>, code: &str) -> Result<LinkDetails, AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .filter(|link| owner.is_none_or(|o| link.owner_id == Some(o)))
            .ok_or_else(|| not_found(code))?;

        let click_count = self.links.count_clicks(link.id).await?;

        Ok(LinkDetails { link, click_count })
    }

    /// Applies a partial update and evicts the cached redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty patch or `max_clicks` below 1,
    /// and [`AppError::NotFound`] if no link visible to `owner` has this code.
    pub async fn update(
        &self,
        owner: Option<i64>,
        code: &str,
        patch: LinkPatch,
    ) -> Result<Link, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "code": code }),
            ));
        }
        if let Some(Some(max_clicks)) = patch.max_clicks
            && max_clicks < 1
        {
            return Err(AppError::bad_request(
                "max_clicks must be at least 1",
                json!({ "max_clicks": max_clicks }),
            ));
        }
        if let Some(title) = &patch.title {
            check_title(title.as_deref())?;
        }

        let link = self
            .links
            .update(code, owner, patch)
            .await?
            .ok_or_else(|| not_found(code))?;

        info!(code, "Link updated");
        self.hooks.after(LinkMutation::Updated { code }).await;

        Ok(link)
    }

    /// Disables a link and evicts the cached redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link visible to `owner` has this code.
    pub async fn deactivate(&self, owner: Option<i64>, code: &str) -> Result<Link, AppError> {
        let link = self
            .links
            .update(code, owner, LinkPatch::deactivate())
            .await?
            .ok_or_else(|| not_found(code))?;

        info!(code, "Link deactivated");
        self.hooks.after(LinkMutation::Deactivated { code }).await;

        Ok(link)
    }

    /// Deletes a link with its clicks and evicts the cached redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link visible to `owner` has this code.
    pub async fn delete(&self, owner: Option<i64>, code: &str) -> Result<(), AppError> {
        if !self.links.delete(code, owner).await? {
            return Err(not_found(code));
        }

        info!(code, "Link deleted");
        self.hooks.after(LinkMutation::Deleted { code }).await;

        Ok(())
    }

    /// Inserts `template` under a fresh random code.
    ///
    /// A code seen by `exists` or rejected by the unique index both count as a
    /// collision.
    async fn create_with_generated_code(&self, template: NewLink) -> Result<Link, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(self.code_length);

            if self.links.exists(&code).await? {
                continue;
            }

            match self
                .links
                .create(NewLink {
                    code,
                    ..template.clone()
                })
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, "Generated code taken on insert, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }
}

/// Builds the public short URL for a code.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

fn check_title(title: Option<&str>) -> Result<(), AppError> {
    match title {
        Some(t) if t.chars().count() > MAX_TITLE_CHARS => Err(AppError::bad_request(
            format!("Title must be at most {MAX_TITLE_CHARS} characters"),
            json!({ "length": t.chars().count() }),
        )),
        _ => Ok(()),
    }
}

/// Trims, drops empty entries, sorts and de-duplicates.
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();

    if tags.len() > MAX_TAGS {
        return Err(AppError::bad_request(
            format!("At most {MAX_TAGS} tags per link"),
            json!({ "count": tags.len() }),
        ));
    }
    if let Some(tag) = tags.iter().find(|t| t.chars().count() > MAX_TAG_CHARS) {
        return Err(AppError::bad_request(
            format!("Tags must be at most {MAX_TAG_CHARS} characters"),
            json!({ "tag": tag }),
        ));
    }

    Ok(tags)
}

/// Runs CPU-heavy password work off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        AppError::internal("Password task failed", json!({ "reason": e.to_string() }))
    })?
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

fn resolve_expiry(
    expires_in_days: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match (expires_in_days, expires_at) {
        (Some(_), Some(_)) => Err(AppError::bad_request(
            "Use either expires_in_days or expires_at, not both",
            json!({}),
        )),
        (Some(days), None) if days > MAX_EXPIRES_IN_DAYS => Err(AppError::bad_request(
            format!("expires_in_days must be at most {MAX_EXPIRES_IN_DAYS}"),
            json!({ "expires_in_days": days }),
        )),
        (Some(days), None) if days > 0 => Duration::try_days(days)
            .and_then(|d| now.checked_add_signed(d))
            .map(Some)
            .ok_or_else(|| {
                AppError::bad_request(
                    "expires_in_days is out of range",
                    json!({ "expires_in_days": days }),
                )
            }),
        (Some(_), None) => Ok(None),
        (None, Some(at)) if at <= now => Err(AppError::bad_request(
            "expires_at must be in the future",
            json!({ "expires_at": at }),
        )),
        (None, at) => Ok(at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheService, MemoryCache};

    fn stored(id: i64, new_link: NewLink) -> Link {
        let mut link = Link::new(id, new_link.code, new_link.destination_url, Utc::now());
        link.title = new_link.title;
        link.owner_id = new_link.owner_id;
        link.expires_at = new_link.expires_at;
        link.max_clicks = new_link.max_clicks;
        link.password_hash = new_link.password_hash;
        link.tags = new_link.tags;
        link
    }

    fn service(repo: MockLinkRepository) -> (LinkService<MockLinkRepository>, MemoryCache) {
        let cache = MemoryCache::default();
        let hooks = MutationHooks::new(Arc::new(cache.clone()));
        (LinkService::new(Arc::new(repo), hooks, 7), cache)
    }

    fn input(url: &str) -> CreateLink {
        CreateLink {
            url: url.to_string(),
            ..CreateLink::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_code_and_warms_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| l.code.len() == 7 && l.owner_id == Some(3))
            .times(1)
            .returning(|l| Ok(stored(10, l)));

        let (service, cache) = service(repo);
        let link = service
            .create(Some(3), input("https://example.com"))
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert_eq!(
            cache.peek(&link.code).await.as_deref(),
            Some("https://example.com/")
        );
    }

    #[tokio::test]
    async fn test_create_with_custom_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(0);
        repo.expect_create()
            .withf(|l| l.code == "my-link")
            .times(1)
            .returning(|l| Ok(stored(1, l)));

        let (service, _) = service(repo);
        let link = service
            .create(
                None,
                CreateLink {
                    custom_code: Some("my-link".to_string()),
                    ..input("https://example.com")
                },
            )
            .await
            .unwrap();

        assert_eq!(link.code, "my-link");
    }

    #[tokio::test]
    async fn test_create_custom_code_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("taken", json!({}))));

        let (service, cache) = service(repo);
        let result = service
            .create(
                None,
                CreateLink {
                    custom_code: Some("taken".to_string()),
                    ..input("https://example.com")
                },
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
        assert!(cache.peek("taken").await.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (service, _) = service(MockLinkRepository::new());

        for bad in [
            input("not-a-url"),
            input("ftp://example.com"),
            CreateLink {
                custom_code: Some("ab".to_string()),
                ..input("https://example.com")
            },
            CreateLink {
                custom_code: Some("health".to_string()),
                ..input("https://example.com")
            },
            CreateLink {
                max_clicks: Some(0),
                ..input("https://example.com")
            },
            CreateLink {
                expires_at: Some(Utc::now() - Duration::hours(1)),
                ..input("https://example.com")
            },
            CreateLink {
                title: Some("t".repeat(MAX_TITLE_CHARS + 1)),
                ..input("https://example.com")
            },
        ] {
            let err = service.create(None, bad.clone()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_create_retries_on_collision_then_exhausts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Ok(true));
        repo.expect_create().times(0);

        let (service, _) = service(repo);
        let err = service
            .create(None, input("https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::CodeSpaceExhausted {
                attempts: MAX_CODE_ATTEMPTS
            }
        ));
    }

    #[tokio::test]
    async fn test_create_unique_violation_counts_as_collision() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(2).returning(|_| Ok(false));

        let mut calls = 0;
        repo.expect_create().times(2).returning(move |l| {
            calls += 1;
            if calls == 1 {
                Err(AppError::conflict("taken", json!({})))
            } else {
                Ok(stored(5, l))
            }
        });

        let (service, _) = service(repo);
        let link = service
            .create(None, input("https://example.com"))
            .await
            .unwrap();
        assert_eq!(link.id, 5);
    }

    #[tokio::test]
    async fn test_create_expires_in_days() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| {
                l.expires_at.is_some_and(|e| {
                    let days = (e - Utc::now()).num_hours();
                    (167..=168).contains(&days)
                })
            })
            .times(1)
            .returning(|l| Ok(stored(1, l)));

        let (service, _) = service(repo);
        service
            .create(
                None,
                CreateLink {
                    expires_in_days: Some(7),
                    ..input("https://example.com")
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_huge_expires_in_days_is_validation_error() {
        let (service, _) = service(MockLinkRepository::new());

        for days in [MAX_EXPIRES_IN_DAYS + 1, i64::MAX / 1000, i64::MAX] {
            let err = service
                .create(
                    None,
                    CreateLink {
                        expires_in_days: Some(days),
                        ..input("https://example.com")
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{days}");
        }
    }

    #[test]
    fn test_resolve_expiry_checked_arithmetic() {
        let near_max = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert!(resolve_expiry(Some(30), None, near_max).is_err());
        assert!(resolve_expiry(Some(MAX_EXPIRES_IN_DAYS), None, Utc::now()).is_ok());
    }

    #[tokio::test]
    async fn test_create_normalizes_tags() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| l.tags == ["docs", "launch"])
            .times(1)
            .returning(|l| Ok(stored(1, l)));

        let (service, _) = service(repo);
        let link = service
            .create(
                None,
                CreateLink {
                    tags: vec![" launch ".into(), "docs".into(), "".into(), "launch".into()],
                    ..input("https://example.com")
                },
            )
            .await
            .unwrap();

        assert_eq!(link.tags, ["docs", "launch"]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_tags() {
        let (service, _) = service(MockLinkRepository::new());

        let too_many = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        let too_long = vec!["x".repeat(MAX_TAG_CHARS + 1)];

        for tags in [too_many, too_long] {
            let err = service
                .create(
                    None,
                    CreateLink {
                        tags,
                        ..input("https://example.com")
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_create_with_password_stores_hash() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|l| {
                l.password_hash
                    .as_deref()
                    .is_some_and(|h| h.starts_with("$argon2") && !h.contains("hunter22"))
            })
            .times(1)
            .returning(|l| Ok(stored(1, l)));

        let (service, _) = service(repo);
        let link = service
            .create(
                None,
                CreateLink {
                    password: Some("hunter22".into()),
                    ..input("https://example.com")
                },
            )
            .await
            .unwrap();

        assert!(link.password_hash.is_some());
    }

    #[tokio::test]
    async fn test_check_password() {
        let hash = hash_password("hunter22").unwrap();
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(move |code| {
            let mut link = Link::new(1, code.to_string(), "https://example.com".into(), Utc::now());
            if code == "locked" {
                link.password_hash = Some(hash.clone());
            }
            Ok(Some(link))
        });

        let (service, _) = service(repo);

        assert!(service.check_password("locked", "hunter22").await.is_ok());
        assert!(matches!(
            service.check_password("locked", "wrong").await.unwrap_err(),
            AppError::Forbidden {
                code: "invalid_password",
                ..
            }
        ));
        assert!(service.check_password("open", "anything").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_bulk_limits_and_isolates_failures() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_create().returning(|l| Ok(stored(1, l)));

        let (service, _) = service(repo);

        assert!(service.create_bulk(None, vec![]).await.is_err());
        assert!(
            service
                .create_bulk(None, vec![input("https://example.com"); MAX_BULK_ITEMS + 1])
                .await
                .is_err()
        );

        let results = service
            .create_bulk(
                None,
                vec![input("https://a.example"), input("bad"), input("https://b.example")],
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_get_hides_foreign_links() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(|code| {
            let mut link = Link::new(1, code.to_string(), "https://example.com".into(), Utc::now());
            link.owner_id = Some(1);
            Ok(Some(link))
        });
        repo.expect_count_clicks().returning(|_| Ok(4));

        let (service, _) = service(repo);

        let details = service.get(Some(1), "abc123").await.unwrap();
        assert_eq!(details.click_count, 4);

        let err = service.get(Some(2), "abc123").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_evicts_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_update()
            .withf(|code, owner, patch| code == "abc123" && *owner == Some(1) && patch.is_active == Some(false))
            .times(1)
            .returning(|code, _, _| {
                let mut link = Link::new(1, code.to_string(), "https://example.com".into(), Utc::now());
                link.is_active = false;
                Ok(Some(link))
            });

        let (service, cache) = service(repo);
        cache
            .set_url("abc123", "https://example.com", None)
            .await
            .unwrap();

        let link = service.deactivate(Some(1), "abc123").await.unwrap();

        assert!(!link.is_active);
        assert!(cache.peek("abc123").await.is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch() {
        let (service, _) = service(MockLinkRepository::new());
        let err = service
            .update(None, "abc123", LinkPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_link_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete().times(1).returning(|_, _| Ok(false));

        let (service, _) = service(repo);
        let err = service.delete(Some(1), "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_evicts_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete().times(1).returning(|_, _| Ok(true));

        let (service, cache) = service(repo);
        cache
            .set_url("abc123", "https://example.com", None)
            .await
            .unwrap();

        service.delete(None, "abc123").await.unwrap();
        assert!(cache.peek("abc123").await.is_none());
    }

    #[test]
    fn test_short_url() {
        assert_eq!(short_url("http://localhost:8080/", "abc"), "http://localhost:8080/abc");
        assert_eq!(short_url("https://s.example", "abc"), "https://s.example/abc");
    }
}
