//! Link password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde_json::json;

use crate::error::AppError;

/// Shortest accepted link password.
pub const MIN_PASSWORD_LEN: usize = 4;
/// Longest accepted link password.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Hashes a link password into a PHC string.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the length is outside
/// `MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN`.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::bad_request(
            format!("Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"),
            json!({ "length": len }),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))
}

/// Checks `password` against a stored PHC string.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        AppError::internal("Stored password hash is malformed", json!({ "reason": e.to_string() }))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
