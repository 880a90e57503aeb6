//! Per-day click counters, drained by the click-flush worker.
//!
//! Keys are `clicks:{link_id}:{YYYYMMDD}` (UTC day). Counters are atomically
//! incremented on every redirect and live for two days, giving the flush
//! worker a full day of slack to make a counter durable before Redis lets it
//! go.

use super::CacheResult;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

const CLICK_PREFIX: &str = "clicks:";
const CLICK_TTL_SECS: i64 = 86_400 * 2;
const DAY_KEY_FORMAT: &str = "%Y%m%d";

/// One pending counter as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCounter {
    pub link_id: i64,
    pub date: NaiveDate,
    pub count: i64,
}

/// Per-day click counter store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickCache: Send + Sync {
    /// Atomically increments today's counter for `link_id`; returns the new
    /// count.
    async fn increment(&self, link_id: i64) -> CacheResult<i64>;

    /// Today's count for `link_id` (0 if absent).
    async fn count_today(&self, link_id: i64) -> CacheResult<i64>;

    /// All counters currently pending a durable flush.
    async fn list_pending(&self) -> CacheResult<Vec<PendingCounter>>;

    /// Deletes a counter once it has been durably flushed.
    async fn delete(&self, link_id: i64, date: NaiveDate) -> CacheResult<()>;
}

/// Redis-backed click counter store.
pub struct RedisClickCache {
    conn: ConnectionManager,
}

impl RedisClickCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(link_id: i64, date: NaiveDate) -> String {
        format!("{}{}:{}", CLICK_PREFIX, link_id, date.format(DAY_KEY_FORMAT))
    }

    fn parse_key(key: &str) -> Option<(i64, NaiveDate)> {
        let rest = key.strip_prefix(CLICK_PREFIX)?;
        let (id_part, date_part) = rest.split_once(':')?;
        let link_id = id_part.parse().ok()?;
        let date = NaiveDate::parse_from_str(date_part, DAY_KEY_FORMAT).ok()?;
        Some((link_id, date))
    }
}

#[async_trait]
impl ClickCache for RedisClickCache {
    async fn increment(&self, link_id: i64) -> CacheResult<i64> {
        let key = Self::key(link_id, Utc::now().date_naive());
        let mut conn = self.conn.clone();

        let count: i64 = conn.incr(&key, 1).await?;

        // First increment of the day arms the TTL; INCR never re-arms it, so
        // concurrent callers cannot extend a counter's life.
        if count == 1 {
            conn.expire::<_, ()>(&key, CLICK_TTL_SECS).await?;
        }

        Ok(count)
    }

    async fn count_today(&self, link_id: i64) -> CacheResult<i64> {
        let key = Self::key(link_id, Utc::now().date_naive());
        let mut conn = self.conn.clone();

        let count: Option<i64> = conn.get(&key).await?;
        Ok(count.unwrap_or(0))
    }

    async fn list_pending(&self) -> CacheResult<Vec<PendingCounter>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", CLICK_PREFIX);

        // Cursor-based SCAN keeps the store responsive; KEYS would block it.
        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<i64>> = conn.mget(&keys).await?;

        let pending = keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| {
                let (link_id, date) = Self::parse_key(key)?;
                Some(PendingCounter {
                    link_id,
                    date,
                    // A counter deleted between SCAN and MGET reads as 0 and
                    // is dropped by the flush worker.
                    count: value?,
                })
            })
            .collect();

        Ok(pending)
    }

    async fn delete(&self, link_id: i64, date: NaiveDate) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(link_id, date)).await?;
        debug!("click counter flushed and deleted: link {} {}", link_id, date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert_eq!(RedisClickCache::key(42, date), "clicks:42:20260828");
    }

    #[test]
    fn test_parse_key_round_trip() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let key = RedisClickCache::key(7, date);
        assert_eq!(RedisClickCache::parse_key(&key), Some((7, date)));
    }

    #[test]
    fn test_parse_key_rejects_garbage() {
        assert_eq!(RedisClickCache::parse_key("clicks:notanumber:20260828"), None);
        assert_eq!(RedisClickCache::parse_key("clicks:42:2026-08-28"), None);
        assert_eq!(RedisClickCache::parse_key("other:42:20260828"), None);
    }
}
