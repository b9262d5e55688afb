//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::link_service::{CreateLink, LinkDetails, short_url};
use crate::domain::entities::{Link, LinkPatch};
use crate::error::ErrorInfo;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request body for `POST /api/links`, also used for each bulk item.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Destination URL (absolute `http`/`https`).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    #[validate(length(min = 3, max = 20))]
    #[validate(regex(path = "*CUSTOM_CODE_REGEX"))]
    pub custom_code: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    /// Days until expiry. Mutually exclusive with `expires_at`.
    #[validate(range(min = 1, max = 3650))]
    pub expires_in_days: Option<i64>,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1))]
    pub max_clicks: Option<i64>,

    /// Locks the link. Visitors open it with `POST /{code}/unlock`.
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10))]
    pub tags: Vec<String>,
}

impl From<CreateLinkRequest> for CreateLink {
    fn from(r: CreateLinkRequest) -> Self {
        CreateLink {
            url: r.url,
            custom_code: r.custom_code,
            title: r.title,
            expires_in_days: r.expires_in_days,
            expires_at: r.expires_at,
            max_clicks: r.max_clicks,
            password: r.password,
            tags: r.tags,
        }
    }
}

/// Request body for `POST /api/links/bulk`.
///
/// The batch size and every item are checked by the link service, so a bad item
/// does not reject the batch.
#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub links: Vec<CreateLinkRequest>,
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub summary: BatchSummary,
    pub items: Vec<BulkResultItem>,
}

/// Individual result for a URL in the batch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BulkResultItem {
    Success {
        url: String,
        code: String,
        short_url: String,
    },
    Error {
        url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Request body for `PATCH /api/links/{code}`.
///
/// All fields are optional and only provided fields are changed. For the
/// nullable fields an absent key leaves the value unchanged, `null` clears it
/// and a value sets it.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub max_clicks: Option<Option<i64>>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(r: UpdateLinkRequest) -> Self {
        LinkPatch {
            title: r
                .title
                .map(|t| t.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())),
            is_active: r.is_active,
            expires_at: r.expires_at,
            max_clicks: r.max_clicks,
        }
    }
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub password_protected: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &link.code),
            code: link.code,
            destination_url: link.destination_url,
            title: link.title,
            is_active: link.is_active,
            expires_at: link.expires_at,
            max_clicks: link.max_clicks,
            password_protected: link.password_hash.is_some(),
            tags: link.tags,
            click_count: None,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }

    pub fn from_details(details: LinkDetails, base_url: &str) -> Self {
        Self {
            click_count: Some(details.click_count),
            ..Self::from_link(details.link, base_url)
        }
    }
}

/// Request body for `POST /{code}/unlock`.
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// Destination of an unlocked link.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub url: String,
}
