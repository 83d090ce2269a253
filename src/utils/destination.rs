//! Destination URL parsing.
//!
//! Destinations are stored in their parsed, serialized form (`url::Url`
//! adds the root path to bare hosts and lowercases scheme and host), so the
//! stored value is what redirects and analytics report back.

use url::Url;

/// Longest destination the record store accepts.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DestinationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS URLs can be shortened")]
    UnsupportedScheme,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Parses a user-supplied destination into its canonical string form.
///
/// # Errors
///
/// Rejects malformed input, schemes other than `http`/`https`, URLs
/// without a host, and anything longer than [`MAX_URL_LENGTH`] once
/// serialized.
pub fn parse_destination(input: &str) -> Result<String, DestinationError> {
    let url = Url::parse(input.trim()).map_err(|e| DestinationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DestinationError::UnsupportedScheme);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(DestinationError::MissingHost);
    }

    let serialized = String::from(url);
    if serialized.len() > MAX_URL_LENGTH {
        return Err(DestinationError::TooLong);
    }

    Ok(serialized)
}
