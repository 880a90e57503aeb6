//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link with the metadata the redirect path needs.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// bcrypt hash; `Some` makes the link password-protected.
    pub password_hash: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
}
