//! Utility functions for code generation, URL validation, and request handling.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_validator`] - Destination URL validation
//! - [`client_ip`] - Client address extraction from the peer and proxy headers
//! - [`password`] - Argon2 hashing for password-protected links

pub mod client_ip;
pub mod code_generator;
pub mod password;
pub mod url_validator;
