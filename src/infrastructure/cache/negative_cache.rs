//! Negative cache: tombstones for short codes known not to exist.
//!
//! A short fixed TTL bounds how long a tombstone can shield the database.
//! The link-creation path removes the tombstone for a freshly minted code so
//! a new link is never masked by an earlier miss.

use super::CacheResult;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

const NOT_FOUND_PREFIX: &str = "notfound:";

/// Cache of confirmed-absent short codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NegativeCache: Send + Sync {
    /// Returns true if the code was recently resolved to "not found".
    async fn contains(&self, code: &str) -> CacheResult<bool>;

    /// Records that a lookup for `code` found nothing.
    async fn mark(&self, code: &str) -> CacheResult<()>;

    /// Clears a tombstone (used when a code becomes newly valid).
    async fn remove(&self, code: &str) -> CacheResult<()>;
}

/// Redis-backed negative cache.
pub struct RedisNegativeCache {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisNegativeCache {
    pub fn new(conn: ConnectionManager, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    fn key(code: &str) -> String {
        format!("{}{}", NOT_FOUND_PREFIX, code)
    }
}

#[async_trait]
impl NegativeCache for RedisNegativeCache {
    async fn contains(&self, code: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let hit: bool = conn.exists(Self::key(code)).await?;
        Ok(hit)
    }

    async fn mark(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(code), "1", self.ttl_secs)
            .await?;
        debug!("negative cache MARK: {}", code);
        Ok(())
    }

    async fn remove(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(code)).await?;
        Ok(())
    }
}
