//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache maintenance, validation, and business rules. Services consume
//! repository traits and provide a clean API for HTTP handlers and the
//! operator CLI.
//!
//! # Available Services
//!
//! - [`services::resolver::Resolver`] - Redirect resolution with corroborated cache hits
//! - [`services::mutation_hooks::MutationHooks`] - Cache maintenance after link mutations
//! - [`services::link_service::LinkService`] - Short link creation and management
//! - [`services::stats_service::StatsService`] - Click analytics
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
