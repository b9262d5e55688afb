//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod stats;

pub use health::health_handler;
pub use links::{
    bulk_create_handler, create_link_handler, deactivate_link_handler, delete_link_handler,
    get_link_handler, update_link_handler,
};
pub use redirect::{redirect_handler, unlock_handler};
pub use stats::stats_handler;
