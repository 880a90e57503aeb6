//! DTOs for the ban administration endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to ban a client IP.
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    /// The client IP to ban (hashed server-side before storage).
    pub ip: String,
    pub banned_until: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BanResponse {
    pub ip_hash: String,
    pub banned_until: DateTime<Utc>,
}
