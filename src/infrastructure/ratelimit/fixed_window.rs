//! Fixed window rate limiter.
//!
//! One counter per client key, reset every window. Cheapest of the four
//! strategies: one GET plus, on admit, an atomic INCR + EXPIRE NX.
//!
//! Known weakness, deliberately preserved: a client can spend its full limit
//! at the end of one window and again at the start of the next, reaching 2x
//! the limit across the boundary. Acceptable where rough limiting is enough;
//! use the sliding strategies where it is not.

use super::{RateLimitError, RateLimiter};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

const KEY_PREFIX: &str = "ratelimit:fixed:";

/// Fixed-window admission control.
pub struct FixedWindowLimiter {
    conn: ConnectionManager,
    window_secs: u64,
    limit: u64,
}

impl FixedWindowLimiter {
    pub fn new(conn: ConnectionManager, window_secs: u64, limit: u32) -> Self {
        Self {
            conn,
            window_secs,
            limit: limit as u64,
        }
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn is_allowed(&self, client_key: &str) -> Result<bool, RateLimitError> {
        let key = format!("{}{}", KEY_PREFIX, client_key);
        let mut conn = self.conn.clone();

        let count: Option<u64> = conn.get(&key).await?;
        let allowed = count.unwrap_or(0) < self.limit;

        if allowed {
            // EXPIRE NX arms the window only on the first increment, so later
            // increments never push the reset forward.
            redis::pipe()
                .atomic()
                .incr(&key, 1)
                .ignore()
                .cmd("EXPIRE")
                .arg(&key)
                .arg(self.window_secs)
                .arg("NX")
                .ignore()
                .query_async::<()>(&mut conn)
                .await?;
        }

        Ok(allowed)
    }
}
