//! Repository trait for the Link Store.

use crate::domain::entities::{Link, LinkPatch, LinkValidity, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// The authoritative store of links.
///
/// The redirect cache is a projection of this store; only the store decides
/// whether a link is resolvable.
///
/// Mutating methods take an optional `owner_id`. `Some(id)` scopes the operation
/// to links owned by that API token; `None` is the unscoped operator path.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken. This is the
    /// store-level uniqueness guarantee that generation logic relies on.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Fetches the full link by code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Fetches only the fields the resolvability predicate needs.
    ///
    /// `recorded_clicks` is populated only when the link has `max_clicks` set.
    async fn get_validity_fields(&self, code: &str) -> Result<Option<LinkValidity>, AppError>;

    /// Counts the clicks recorded for a link.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;

    /// Returns true if any link uses `code`.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Partially updates a link and bumps `updated_at`.
    ///
    /// Returns `Ok(None)` if no link matches `code` (and `owner_id`, when given).
    async fn update(
        &self,
        code: &str,
        owner_id: Option<i64>,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError>;

    /// Deletes a link and, by cascade, its clicks.
    ///
    /// Returns `Ok(true)` if a link was deleted.
    async fn delete(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
