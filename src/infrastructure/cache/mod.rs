//! Shared-store cache tiers for the redirect pipeline.
//!
//! Four independent tiers, all keyed in Redis and all owned by the cache
//! orchestrator ([`crate::application::services::RedirectService`]):
//!
//! - [`BanCache`] - banned client identities (hashed IPs)
//! - [`NegativeCache`] - "looked up, not found" tombstones
//! - [`LinkCache`] - positive link entries with expiry-bounded TTL
//! - [`ClickCache`] - per-day click counters drained by the flush worker
//!
//! Each tier is a trait so unit tests can substitute mocks; the Redis
//! implementations live alongside. Store failures surface as
//! [`CacheError`] and the orchestrator decides, per call site, whether to
//! fail open.

pub mod ban_cache;
pub mod click_cache;
pub mod link_cache;
pub mod negative_cache;

pub use ban_cache::{BanCache, RedisBanCache};
pub use click_cache::{ClickCache, PendingCounter, RedisClickCache};
pub use link_cache::{CachedLink, LinkCache, RedisLinkCache};
pub use negative_cache::{NegativeCache, RedisNegativeCache};

#[cfg(test)]
pub use ban_cache::MockBanCache;
#[cfg(test)]
pub use click_cache::MockClickCache;
#[cfg(test)]
pub use link_cache::MockLinkCache;
#[cfg(test)]
pub use negative_cache::MockNegativeCache;

use redis::aio::ConnectionManager;
use tracing::info;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Operation(e.to_string())
    }
}

/// Connects to Redis and validates the connection with a PING.
///
/// The returned [`ConnectionManager`] is a cheap-to-clone multiplexed handle;
/// every cache tier and rate limiter clones it per call. Constructed once at
/// startup and passed into components explicitly so tests can substitute
/// fakes.
///
/// # Errors
///
/// Returns [`CacheError::Connection`] if the URL is invalid, the connection
/// cannot be established, or the PING health check fails.
pub async fn connect(redis_url: &str) -> CacheResult<ConnectionManager> {
    info!("Connecting to Redis");

    let client = redis::Client::open(redis_url)
        .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

    let mut test_conn = manager.clone();
    redis::cmd("PING")
        .query_async::<()>(&mut test_conn)
        .await
        .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

    info!("Connected to Redis");

    Ok(manager)
}
