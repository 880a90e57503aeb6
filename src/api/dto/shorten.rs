//! DTOs for the link creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to shorten a URL.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be HTTP/HTTPS).
    pub url: String,

    /// Optional expiry timestamp. After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional password; when set, redirects require it.
    pub password: Option<String>,
}

/// Response for a created link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub password_protected: bool,
}
