//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by the infrastructure layer:
//!
//! - PostgreSQL implementations in `crate::infrastructure::persistence`
//! - An in-process implementation in `crate::infrastructure::memory`
//! - Mock implementations auto-generated via `mockall` for unit tests
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - the Link Store: links and their validity state
//! - [`StatsRepository`] - click recording and analytics
//! - [`TokenRepository`] - API token verification

pub mod link_repository;
pub mod stats_repository;
pub mod token_repository;

pub use link_repository::LinkRepository;
pub use stats_repository::{ServiceTotals, StatsRepository};
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
