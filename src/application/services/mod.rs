//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod mutation_hooks;
pub mod resolver;
pub mod stats_service;

pub use auth_service::AuthService;
pub use link_service::{CreateLink, LinkDetails, LinkService};
pub use mutation_hooks::{LinkMutation, MutationHooks};
pub use resolver::{ResolveSource, Resolved, Resolver};
pub use stats_service::{LinkStatsReport, StatsService};
