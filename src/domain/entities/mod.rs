//! Core domain entities.
//!
//! Entities are plain data structures. Creation and partial update use separate
//! input types:
//! - [`NewLink`], [`NewClick`] - for creating new records
//! - [`LinkPatch`] - for partial updates
//!
//! [`LinkValidity`] is the projection of a [`Link`] that the redirect path re-reads
//! on every resolution.

pub mod click;
pub mod link;

pub use click::{Click, ClickStats, DayCount, NameCount, NewClick};
pub use link::{Link, LinkPatch, LinkValidity, NewLink, Unresolvable};
