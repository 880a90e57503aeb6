//! Sliding window log rate limiter.
//!
//! Keeps the exact timestamp of every request in a per-client sorted set and
//! admits while the set holds no more than `limit` entries inside the window.
//! Exact but memory-proportional to the limit, so it guards low-volume,
//! high-value endpoints (auth attempts), not redirect traffic.

use super::{RateLimitError, RateLimiter};
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;

const KEY_PREFIX: &str = "ratelimit:log:";

/// Sliding-window-log admission control.
pub struct SlidingWindowLogLimiter {
    conn: ConnectionManager,
    window_ms: u64,
    limit: u64,
}

impl SlidingWindowLogLimiter {
    pub fn new(conn: ConnectionManager, window_ms: u64, limit: u32) -> Self {
        Self {
            conn,
            window_ms,
            limit: limit as u64,
        }
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLogLimiter {
    async fn is_allowed(&self, client_key: &str) -> Result<bool, RateLimitError> {
        let key = format!("{}{}", KEY_PREFIX, client_key);
        let now = Utc::now().timestamp_millis();
        let window_start = now - self.window_ms as i64;

        // Trim, insert, count, and re-arm the TTL as one atomic unit;
        // separate round trips would lose updates under concurrent callers.
        let mut conn = self.conn.clone();
        let (_removed, _added, count, _expired): (i64, i64, u64, i64) = redis::pipe()
            .atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(&key)
            .arg(0)
            .arg(window_start)
            .cmd("ZADD")
            .arg(&key)
            .arg(now)
            .arg(now)
            .cmd("ZCARD")
            .arg(&key)
            .cmd("PEXPIRE")
            .arg(&key)
            .arg(self.window_ms)
            .query_async(&mut conn)
            .await?;

        Ok(count <= self.limit)
    }
}
