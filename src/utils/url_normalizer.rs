//! Destination URL validation and normalization.
//!
//! Applied once on the link-creation path. The redirect hot path never
//! touches this module; it serves whatever URL was stored.

use url::Url;

/// Errors that can occur while validating a destination URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("only HTTP and HTTPS destinations are allowed")]
    UnsupportedScheme,
}

/// Validates a destination URL and normalizes it to a canonical form.
///
/// Lowercases the hostname, drops any fragment, and rejects non-HTTP(S)
/// schemes (`javascript:`, `data:`, `file:` and friends are the usual abuse
/// vectors for a public shortener).
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for unparseable input and
/// [`UrlNormalizationError::UnsupportedScheme`] for disallowed schemes.
pub fn normalize_url(raw: &str) -> Result<String, UrlNormalizationError> {
    let mut parsed =
        Url::parse(raw.trim()).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedScheme),
    }

    parsed.set_fragment(None);

    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        assert_eq!(
            normalize_url("https://Example.COM/Path?q=1").unwrap(),
            "https://example.com/Path?q=1"
        );
    }

    #[test]
    fn test_strips_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section").unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for raw in ["javascript:alert(1)", "data:text/html,x", "file:///etc/passwd"] {
            assert!(matches!(
                normalize_url(raw),
                Err(UrlNormalizationError::UnsupportedScheme)
            ));
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }
}
