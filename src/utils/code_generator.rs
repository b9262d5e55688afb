//! Short code generation and validation utilities.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Shortest accepted custom code.
pub const CUSTOM_CODE_MIN_LEN: usize = 3;
/// Longest accepted custom code. Matches the `links.code` column width.
pub const CUSTOM_CODE_MAX_LEN: usize = 20;

/// Codes that collide with top-level routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a random alphanumeric short code of `length` characters.
///
/// Draws from `[A-Za-z0-9]` using the thread-local CSPRNG.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7);
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Checks the shape of a user-provided code: 3-20 characters from `[A-Za-z0-9_-]`.
pub fn is_valid_custom_code(code: &str) -> bool {
    (CUSTOM_CODE_MIN_LEN..=CUSTOM_CODE_MAX_LEN).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validates a user-provided custom short code.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the code has the wrong shape or is reserved.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !is_valid_custom_code(code) {
        return Err(AppError::bad_request(
            "Custom code must be 3-20 characters of letters, digits, '-' or '_'",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
