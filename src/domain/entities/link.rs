//! Link entity and the resolvability predicate.

use chrono::{DateTime, Utc};

/// A shortened URL link with its validity attributes.
///
/// `code` is unique and immutable after creation. Only the validity fields
/// (`is_active`, `expires_at`, `max_clicks`) and `title` change over time.
///
/// A link with a `password_hash` never redirects directly; it is opened through
/// the unlock endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    /// Argon2 PHC string.
    pub password_hash: Option<String>,
    /// Sorted, de-duplicated labels.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates an active link with no expiry and no click limit.
    pub fn new(id: i64, code: String, destination_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            destination_url,
            title: None,
            owner_id: None,
            is_active: true,
            expires_at: None,
            max_clicks: None,
            password_hash: None,
            tags: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Projects the fields the resolvability predicate needs.
    ///
    /// `recorded_clicks` is only meaningful when `max_clicks` is set.
    pub fn validity(&self, recorded_clicks: Option<i64>) -> LinkValidity {
        LinkValidity {
            link_id: self.id,
            is_active: self.is_active,
            expires_at: self.expires_at,
            max_clicks: self.max_clicks,
            recorded_clicks,
            password_protected: self.password_hash.is_some(),
        }
    }
}

/// The lightweight state re-read from the store on every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkValidity {
    pub link_id: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    /// Number of recorded clicks; `None` when `max_clicks` is unset and nobody counted.
    pub recorded_clicks: Option<i64>,
    /// Not part of the predicate. Carried so a hit learns the link is locked.
    pub password_protected: bool,
}

/// Why a link that exists cannot currently be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolvable {
    Disabled,
    Expired,
    ClickLimitReached,
}

impl LinkValidity {
    /// Evaluates the resolvability predicate at `now`.
    ///
    /// Checks run in a fixed order (active, expiry, click limit), so a link that is
    /// both disabled and expired reports `Disabled`. A link with `max_clicks` set but
    /// no click count is treated as having zero clicks.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), Unresolvable> {
        if !self.is_active {
            return Err(Unresolvable::Disabled);
        }

        if self.expires_at.is_some_and(|e| now >= e) {
            return Err(Unresolvable::Expired);
        }

        if let Some(max) = self.max_clicks
            && self.recorded_clicks.unwrap_or(0) >= max
        {
            return Err(Unresolvable::ClickLimitReached);
        }

        Ok(())
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub owner_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub password_hash: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. For the nullable columns `Some(None)` clears
/// the value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_clicks: Option<Option<i64>>,
}

impl LinkPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.is_active.is_none()
            && self.expires_at.is_none()
            && self.max_clicks.is_none()
    }

    /// Applies the patch to an in-memory link.
    pub fn apply(&self, link: &mut Link) {
        if let Some(title) = &self.title {
            link.title = title.clone();
        }
        if let Some(is_active) = self.is_active {
            link.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(max_clicks) = self.max_clicks {
            link.max_clicks = max_clicks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link() -> Link {
        Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_link_creation() {
        let link = link();

        assert_eq!(link.code, "abc123");
        assert!(link.is_active);
        assert!(link.max_clicks.is_none());
        assert!(!link.is_expired());
        assert!(link.tags.is_empty());
        assert_eq!(link.created_at, link.updated_at);
    }

    #[test]
    fn test_password_does_not_affect_resolvability() {
        let mut link = link();
        link.password_hash = Some("$argon2id$v=19$...".to_string());

        let validity = link.validity(None);
        assert!(validity.password_protected);
        assert_eq!(validity.check(Utc::now()), Ok(()));
    }

    #[test]
    fn test_active_link_is_resolvable() {
        assert_eq!(link().validity(None).check(Utc::now()), Ok(()));
    }

    #[test]
    fn test_inactive_link_is_disabled() {
        let mut link = link();
        link.is_active = false;
        link.expires_at = Some(Utc::now() - Duration::hours(1));

        assert_eq!(
            link.validity(None).check(Utc::now()),
            Err(Unresolvable::Disabled)
        );
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let mut link = link();
        link.expires_at = Some(now);

        assert_eq!(link.validity(None).check(now), Err(Unresolvable::Expired));
        assert_eq!(
            link.validity(None).check(now - Duration::milliseconds(1)),
            Ok(())
        );
    }

    #[test]
    fn test_click_limit() {
        let mut link = link();
        link.max_clicks = Some(3);

        assert_eq!(link.validity(Some(2)).check(Utc::now()), Ok(()));
        assert_eq!(
            link.validity(Some(3)).check(Utc::now()),
            Err(Unresolvable::ClickLimitReached)
        );
        assert_eq!(link.validity(None).check(Utc::now()), Ok(()));
    }

    #[test]
    fn test_patch_apply() {
        let mut link = link();
        link.max_clicks = Some(10);

        let patch = LinkPatch {
            title: Some(Some("Docs".to_string())),
            is_active: Some(false),
            expires_at: None,
            max_clicks: Some(None),
        };
        patch.apply(&mut link);

        assert_eq!(link.title.as_deref(), Some("Docs"));
        assert!(!link.is_active);
        assert!(link.max_clicks.is_none());
    }

    #[test]
    fn test_patch_deactivate() {
        let patch = LinkPatch::deactivate();
        assert_eq!(patch.is_active, Some(false));
        assert!(!patch.is_empty());
        assert!(LinkPatch::default().is_empty());
    }
}
