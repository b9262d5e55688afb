//! Destination URL validation.

use url::Url;

/// Errors returned by [`validate_destination_url`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Validates a destination URL and returns it in parsed-and-serialized form.
///
/// Only absolute `http`/`https` URLs with a host are accepted. This rejects
/// `javascript:`, `data:`, `file:` and relative references.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     validate_destination_url("https://Example.com/Path").unwrap(),
///     "https://example.com/Path"
/// );
/// assert!(validate_destination_url("ftp://example.com").is_err());
/// ```
pub fn validate_destination_url(input: &str) -> Result<String, UrlValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url.into()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
