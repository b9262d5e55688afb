//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Length of freshly issued raw tokens.
const TOKEN_LENGTH: usize = 40;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC.
pub fn hash_token(signing_secret: &str, token: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes()).map_err(|e| {
        AppError::internal("Invalid signing secret", json!({ "reason": e.to_string() }))
    })?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Generates a new random raw token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. Read access to the database is not enough to verify or forge
/// tokens without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns its record.
    ///
    /// On success the `last_used_at` timestamp is refreshed on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    pub async fn authenticate(&self, token: &str) -> Result<ApiToken, AppError> {
        let token_hash = hash_token(&self.signing_secret, token)?;

        let api_token = self
            .repository
            .find_active(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Invalid or revoked token"}),
                )
            })?;

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(token_id = api_token.id, error = %e, "Failed to update token last_used_at");
        }

        Ok(api_token)
    }

    /// Issues a new token. Returns the stored record and the raw token, which is
    /// shown once and never stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a token with this name exists.
    pub async fn issue(&self, name: &str) -> Result<(ApiToken, String), AppError> {
        let raw = generate_token();
        let token_hash = hash_token(&self.signing_secret, &raw)?;
        let api_token = self.repository.create_token(name, &token_hash).await?;
        Ok((api_token, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn token(id: i64, hash: &str) -> ApiToken {
        ApiToken {
            id,
            name: "ci".to_string(),
            token_hash: hash.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let expected_hash = hash_token(&test_secret(), "valid-token").unwrap();
        let stored = token(7, &expected_hash);

        mock_repo
            .expect_find_active()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let api_token = service.authenticate("valid-token").await.unwrap();
        assert_eq!(api_token.id, 7);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().times(0);

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("invalid-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_last_used_failure_does_not_reject() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo
            .expect_find_active()
            .returning(|hash| Ok(Some(token(1, hash))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::unavailable("db down", json!({}))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());
        assert!(service.authenticate("tok").await.is_ok());
    }

    #[tokio::test]
    async fn test_issue_stores_hash_not_raw_token() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo
            .expect_create_token()
            .withf(|name, hash| name == "ci" && hash.len() == 64)
            .times(1)
            .returning(|_, hash| Ok(token(1, hash)));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());
        let (api_token, raw) = service.issue("ci").await.unwrap();

        assert_eq!(raw.len(), TOKEN_LENGTH);
        assert_eq!(
            api_token.token_hash,
            hash_token(&test_secret(), &raw).unwrap()
        );
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token").unwrap();
        let hash2 = hash_token(&test_secret(), "test-token").unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(
            hash_token("secret-a", "token").unwrap(),
            hash_token("secret-b", "token").unwrap()
        );
    }
}
