//! Positive link cache with expiry-bounded TTL.
//!
//! Entries are JSON-serialized [`CachedLink`] values. The TTL tracks the
//! link's own expiry so a cached entry cannot long outlive its link, clamped
//! between a floor (avoids thrashing on nearly-expired links) and a cap
//! (bounds staleness for links that never expire).

use super::{CacheError, CacheResult};
use crate::domain::entities::Link;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const LINK_PREFIX: &str = "link:";

/// The link fields the redirect pipeline needs, as cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLink {
    pub id: i64,
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub user_id: i64,
}

impl From<&Link> for CachedLink {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url.clone(),
            is_active: link.is_active,
            expires_at: link.expires_at,
            password_hash: link.password_hash.clone(),
            user_id: link.user_id,
        }
    }
}

/// Cache of resolved links, keyed by short code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkCache: Send + Sync {
    /// Fetches a cached link.
    ///
    /// A corrupt entry (JSON that no longer parses) is deleted and reported
    /// as a miss; corruption never propagates to the caller.
    async fn get(&self, code: &str) -> CacheResult<Option<CachedLink>>;

    /// Stores a link with a TTL derived from its expiry.
    async fn set(&self, code: &str, link: &CachedLink) -> CacheResult<()>;

    /// Removes a single cached link.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Removes several cached links in one round trip.
    async fn invalidate_many(&self, codes: &[String]) -> CacheResult<()>;
}

/// Redis-backed link cache.
pub struct RedisLinkCache {
    conn: ConnectionManager,
    ttl_floor_secs: u64,
    ttl_cap_secs: u64,
}

impl RedisLinkCache {
    pub fn new(conn: ConnectionManager, ttl_floor_secs: u64, ttl_cap_secs: u64) -> Self {
        Self {
            conn,
            ttl_floor_secs,
            ttl_cap_secs,
        }
    }

    fn key(code: &str) -> String {
        format!("{}{}", LINK_PREFIX, code)
    }
}

/// TTL for a cached link: seconds until the link expires, clamped to
/// `[floor, cap]`; links without an expiry get the cap.
fn compute_ttl(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    floor_secs: u64,
    cap_secs: u64,
) -> u64 {
    match expires_at {
        None => cap_secs,
        Some(expiry) => {
            let until = (expiry - now).num_seconds().max(0) as u64;
            until.clamp(floor_secs, cap_secs)
        }
    }
}

#[async_trait]
impl LinkCache for RedisLinkCache {
    async fn get(&self, code: &str) -> CacheResult<Option<CachedLink>> {
        let key = Self::key(code);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn.get(&key).await?;
        let Some(raw) = raw else {
            debug!("link cache MISS: {}", code);
            return Ok(None);
        };

        match serde_json::from_str::<CachedLink>(&raw) {
            Ok(link) => {
                debug!("link cache HIT: {}", code);
                Ok(Some(link))
            }
            Err(e) => {
                // Self-heal: drop the corrupt entry and report a miss.
                warn!("corrupt link cache entry for {}: {}", code, e);
                conn.del::<_, ()>(&key).await?;
                Ok(None)
            }
        }
    }

    async fn set(&self, code: &str, link: &CachedLink) -> CacheResult<()> {
        let ttl = compute_ttl(
            link.expires_at,
            Utc::now(),
            self.ttl_floor_secs,
            self.ttl_cap_secs,
        );
        let value =
            serde_json::to_string(link).map_err(|e| CacheError::Operation(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(code), value, ttl).await?;

        debug!("link cache SET: {} (TTL: {}s)", code, ttl);
        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(code)).await?;
        debug!("link cache INVALIDATE: {}", code);
        Ok(())
    }

    async fn invalidate_many(&self, codes: &[String]) -> CacheResult<()> {
        if codes.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = codes.iter().map(|c| Self::key(c)).collect();
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(keys).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const FLOOR: u64 = 60;
    const CAP: u64 = 86_400;

    #[test]
    fn test_ttl_no_expiry_gets_cap() {
        assert_eq!(compute_ttl(None, Utc::now(), FLOOR, CAP), CAP);
    }

    #[test]
    fn test_ttl_tracks_time_until_expiry() {
        let now = Utc::now();
        let ttl = compute_ttl(Some(now + Duration::hours(2)), now, FLOOR, CAP);
        assert_eq!(ttl, 7_200);
    }

    #[test]
    fn test_ttl_distant_expiry_capped() {
        let now = Utc::now();
        let ttl = compute_ttl(Some(now + Duration::days(30)), now, FLOOR, CAP);
        assert_eq!(ttl, CAP);
    }

    #[test]
    fn test_ttl_near_or_past_expiry_floored() {
        let now = Utc::now();
        assert_eq!(
            compute_ttl(Some(now + Duration::seconds(5)), now, FLOOR, CAP),
            FLOOR
        );
        assert_eq!(
            compute_ttl(Some(now - Duration::hours(1)), now, FLOOR, CAP),
            FLOOR
        );
    }

    #[test]
    fn test_cached_link_round_trips_through_json() {
        let link = CachedLink {
            id: 42,
            original_url: "https://example.com/".to_string(),
            is_active: true,
            expires_at: None,
            password_hash: Some("$2b$12$abc".to_string()),
            user_id: 7,
        };

        let json = serde_json::to_string(&link).unwrap();
        let back: CachedLink = serde_json::from_str(&json).unwrap();
        assert_eq!(back, link);
    }
}
