//! Ban cache: banned client identities, keyed by hashed IP.
//!
//! Key existence alone means "banned"; the TTL enforces auto-expiry, so there
//! is no separate unban sweep. The stored value carries the reason and expiry
//! for operator tooling.

use super::{CacheError, CacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BAN_PREFIX: &str = "ban:";

/// Ban record stored as the key's value.
#[derive(Debug, Serialize, Deserialize)]
pub struct BanEntry {
    pub reason: String,
    pub banned_until: DateTime<Utc>,
}

/// Cache of banned client identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BanCache: Send + Sync {
    /// Returns true if the hashed identity is currently banned.
    async fn is_banned(&self, ip_hash: &str) -> CacheResult<bool>;

    /// Bans an identity until `banned_until`. A ban expiring in the past is
    /// a no-op.
    async fn ban(
        &self,
        ip_hash: &str,
        banned_until: DateTime<Utc>,
        reason: &str,
    ) -> CacheResult<()>;

    /// Lifts a ban immediately.
    async fn unban(&self, ip_hash: &str) -> CacheResult<()>;
}

/// Redis-backed ban cache.
pub struct RedisBanCache {
    conn: ConnectionManager,
}

impl RedisBanCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(ip_hash: &str) -> String {
        format!("{}{}", BAN_PREFIX, ip_hash)
    }
}

#[async_trait]
impl BanCache for RedisBanCache {
    async fn is_banned(&self, ip_hash: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let banned: bool = conn.exists(Self::key(ip_hash)).await?;
        Ok(banned)
    }

    async fn ban(
        &self,
        ip_hash: &str,
        banned_until: DateTime<Utc>,
        reason: &str,
    ) -> CacheResult<()> {
        let ttl = (banned_until - Utc::now()).num_seconds();
        if ttl <= 0 {
            return Ok(());
        }

        let entry = BanEntry {
            reason: reason.to_string(),
            banned_until,
        };
        let value =
            serde_json::to_string(&entry).map_err(|e| CacheError::Operation(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(ip_hash), value, ttl as u64)
            .await?;

        debug!("banned {} for {}s: {}", ip_hash, ttl, reason);
        Ok(())
    }

    async fn unban(&self, ip_hash: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(ip_hash)).await?;
        Ok(())
    }
}
