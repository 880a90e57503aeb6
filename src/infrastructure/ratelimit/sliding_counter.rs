//! Sliding window counter rate limiter.
//!
//! Approximates a sliding window with two fixed slots: the current slot's
//! count plus the previous slot's count weighted by how much of the previous
//! slot still overlaps the sliding window. Constant memory per client, good
//! enough accuracy for write-path limiting (link creation).

use super::{RateLimitError, RateLimiter};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, aio::ConnectionManager};

const KEY_PREFIX: &str = "ratelimit:slot:";

/// Sliding-window-counter admission control.
pub struct SlidingWindowCounterLimiter {
    conn: ConnectionManager,
    window_ms: u64,
    limit: u64,
}

impl SlidingWindowCounterLimiter {
    pub fn new(conn: ConnectionManager, window_ms: u64, limit: u32) -> Self {
        Self {
            conn,
            window_ms,
            limit: limit as u64,
        }
    }

    fn slot_key(&self, client_key: &str, slot: u64) -> String {
        format!("{}{}:{}", KEY_PREFIX, client_key, slot)
    }
}

/// Weighted request estimate for the sliding window ending now.
///
/// `elapsed_fraction` is how far we are into the current slot; the previous
/// slot contributes the complementary share of its count.
fn estimate(current: u64, previous: u64, elapsed_fraction: f64) -> f64 {
    current as f64 + previous as f64 * (1.0 - elapsed_fraction)
}

#[async_trait]
impl RateLimiter for SlidingWindowCounterLimiter {
    async fn is_allowed(&self, client_key: &str) -> Result<bool, RateLimitError> {
        let now_ms = Utc::now().timestamp_millis() as u64;
        let current_slot = now_ms / self.window_ms;

        let current_key = self.slot_key(client_key, current_slot);
        let previous_key = self.slot_key(client_key, current_slot - 1);

        let mut conn = self.conn.clone();
        let counts: Vec<Option<u64>> = conn.mget(&[&current_key, &previous_key]).await?;
        let current = counts.first().copied().flatten().unwrap_or(0);
        let previous = counts.get(1).copied().flatten().unwrap_or(0);

        let elapsed_fraction = (now_ms % self.window_ms) as f64 / self.window_ms as f64;

        if estimate(current, previous, elapsed_fraction) >= self.limit as f64 {
            return Ok(false);
        }

        // TTL of two windows keeps the slot readable as "previous" for one
        // full window after it stops being "current".
        let ttl_secs = (self.window_ms * 2).div_ceil(1000);
        redis::pipe()
            .atomic()
            .incr(&current_key, 1)
            .ignore()
            .expire(&current_key, ttl_secs as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_start_of_slot_counts_full_previous() {
        assert_eq!(estimate(0, 10, 0.0), 10.0);
    }

    #[test]
    fn test_estimate_end_of_slot_ignores_previous() {
        let e = estimate(3, 10, 1.0);
        assert!((e - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_estimate_midway_weights_half() {
        assert_eq!(estimate(4, 10, 0.5), 9.0);
    }

    #[test]
    fn test_estimate_monotonic_in_current_count() {
        assert!(estimate(5, 10, 0.3) < estimate(6, 10, 0.3));
    }
}
