//! DTO for the health check endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Remaining pre-minted short codes in this instance's pool.
    pub key_pool_depth: usize,
}
