//! Redirect resolution decision.
//!
//! [`decide`] is pure: it takes what the resolver observed in the cache and the
//! store and returns what should happen next. All I/O (and therefore all cache
//! writes) stays in [`crate::application::services::Resolver`].
//!
//! The cache only ever holds `code -> destination_url`. A cache hit is therefore
//! never trusted on its own; it must be corroborated by the link's current
//! [`LinkValidity`].

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{Link, LinkValidity, Unresolvable};
use crate::error::AppError;

/// Typed failure of a single `resolve` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Short link not found")]
    NotFound,
    #[error("Link has been disabled")]
    LinkDisabled,
    #[error("Link has expired")]
    LinkExpired,
    #[error("Link click limit reached")]
    ClickLimitReached,
    #[error("Link store unavailable")]
    StoreUnavailable,
}

impl From<Unresolvable> for ResolveError {
    fn from(reason: Unresolvable) -> Self {
        match reason {
            Unresolvable::Disabled => ResolveError::LinkDisabled,
            Unresolvable::Expired => ResolveError::LinkExpired,
            Unresolvable::ClickLimitReached => ResolveError::ClickLimitReached,
        }
    }
}

impl ResolveError {
    /// Stable identifier used in logs, metrics and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveError::NotFound => "not_found",
            ResolveError::LinkDisabled => "link_disabled",
            ResolveError::LinkExpired => "link_expired",
            ResolveError::ClickLimitReached => "click_limit_reached",
            ResolveError::StoreUnavailable => "store_unavailable",
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound => AppError::not_found(e.to_string(), json!({})),
            ResolveError::LinkDisabled
            | ResolveError::LinkExpired
            | ResolveError::ClickLimitReached => AppError::gone(e.as_str(), e.to_string(), json!({})),
            ResolveError::StoreUnavailable => AppError::unavailable(e.to_string(), json!({})),
        }
    }
}

/// What the resolver saw for one code.
#[derive(Debug, Clone)]
pub enum Observation {
    /// The cache returned `url`; the store was asked for the validity fields only.
    Cached {
        url: String,
        validity: Option<LinkValidity>,
    },
    /// The cache missed; the store was asked for the full link.
    ///
    /// `recorded_clicks` is filled only when the link has `max_clicks` set.
    Stored {
        link: Option<Link>,
        recorded_clicks: Option<i64>,
    },
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Cached URL corroborated by the store. Nothing to write.
    Hit {
        link_id: i64,
        destination_url: String,
        password_protected: bool,
    },
    /// Cached URL refuted by the store. The cache entry must be evicted.
    StaleHit(ResolveError),
    /// Resolvable link read from the store. The cache should be populated.
    MissResolvable {
        link_id: i64,
        destination_url: String,
        password_protected: bool,
    },
    /// Link missing or unresolvable. The cache must not be populated.
    MissUnresolvable(ResolveError),
}

impl Decision {
    /// Collapses the decision into the caller-facing result.
    pub fn outcome(&self) -> Result<Target<'_>, ResolveError> {
        match self {
            Decision::Hit {
                link_id,
                destination_url,
                password_protected,
            }
            | Decision::MissResolvable {
                link_id,
                destination_url,
                password_protected,
            } => Ok(Target {
                link_id: *link_id,
                destination_url,
                password_protected: *password_protected,
            }),
            Decision::StaleHit(e) | Decision::MissUnresolvable(e) => Err(e.clone()),
        }
    }
}

/// Where a resolvable code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub link_id: i64,
    pub destination_url: &'a str,
    pub password_protected: bool,
}

/// Decides the outcome of a resolution from its observation at time `now`.
pub fn decide(observation: Observation, now: DateTime<Utc>) -> Decision {
    match observation {
        Observation::Cached { url, validity } => match validity {
            None => Decision::StaleHit(ResolveError::NotFound),
            Some(v) => match v.check(now) {
                Ok(()) => Decision::Hit {
                    link_id: v.link_id,
                    destination_url: url,
                    password_protected: v.password_protected,
                },
                Err(reason) => Decision::StaleHit(reason.into()),
            },
        },
        Observation::Stored {
            link,
            recorded_clicks,
        } => match link {
            None => Decision::MissUnresolvable(ResolveError::NotFound),
            Some(link) => match link.validity(recorded_clicks).check(now) {
                Ok(()) => Decision::MissResolvable {
                    link_id: link.id,
                    password_protected: link.password_hash.is_some(),
                    destination_url: link.destination_url,
                },
                Err(reason) => Decision::MissUnresolvable(reason.into()),
            },
        },
    }
}
