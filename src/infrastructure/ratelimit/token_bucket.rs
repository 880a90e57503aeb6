//! Token bucket rate limiter with a server-side scripted update.
//!
//! Each client has a virtual bucket of `capacity` tokens refilling
//! continuously at `refill_rate` tokens per second, persisted as a token
//! count plus a last-refill timestamp. The whole read-refill-deduct-write
//! sequence runs as one Lua script inside Redis: a naive get-then-set
//! version has a race window where two concurrent callers read the same
//! stale count and both admit, exceeding capacity.

use super::{RateLimitError, RateLimiter};
use async_trait::async_trait;
use chrono::Utc;
use redis::{Script, aio::ConnectionManager};

const TOKENS_PREFIX: &str = "ratelimit:bucket:tokens:";
const REFILL_PREFIX: &str = "ratelimit:bucket:refill:";

/// Atomic refill-and-deduct. Returns 1 when admitted, 0 when limited.
/// Both keys carry a TTL so idle buckets evaporate from the store.
const TOKEN_BUCKET_SCRIPT: &str = r#"
    local tokens_key = KEYS[1]
    local refill_key = KEYS[2]
    local capacity = tonumber(ARGV[1])
    local refill_rate = tonumber(ARGV[2])
    local now = tonumber(ARGV[3])
    local ttl = tonumber(ARGV[4])

    local tokens = tonumber(redis.call('get', tokens_key) or capacity)
    local last_refill = tonumber(redis.call('get', refill_key) or now)

    local elapsed = math.max(0, now - last_refill)
    tokens = math.min(capacity, tokens + (elapsed / 1000) * refill_rate)

    if tokens >= 1 then
        redis.call('setex', tokens_key, ttl, tokens - 1)
        redis.call('setex', refill_key, ttl, now)
        return 1
    else
        return 0
    end
"#;

/// Token-bucket admission control.
pub struct TokenBucketLimiter {
    conn: ConnectionManager,
    script: Script,
    capacity: u32,
    refill_rate: f64,
}

impl TokenBucketLimiter {
    pub fn new(conn: ConnectionManager, capacity: u32, refill_rate: f64) -> Self {
        Self {
            conn,
            script: Script::new(TOKEN_BUCKET_SCRIPT),
            capacity,
            refill_rate,
        }
    }

    /// TTL generous enough that a bucket is only dropped once it would have
    /// fully refilled anyway.
    fn ttl_secs(&self) -> u64 {
        (self.capacity as f64 / self.refill_rate).ceil() as u64 + 60
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn is_allowed(&self, client_key: &str) -> Result<bool, RateLimitError> {
        let tokens_key = format!("{}{}", TOKENS_PREFIX, client_key);
        let refill_key = format!("{}{}", REFILL_PREFIX, client_key);

        let mut conn = self.conn.clone();
        let admitted: i64 = self
            .script
            .key(&tokens_key)
            .key(&refill_key)
            .arg(self.capacity)
            .arg(self.refill_rate)
            .arg(Utc::now().timestamp_millis())
            .arg(self.ttl_secs())
            .invoke_async(&mut conn)
            .await?;

        Ok(admitted == 1)
    }
}

/// Pure mirror of the script's arithmetic, used by tests to check the
/// admission bound without a live store.
#[cfg(test)]
fn refill_and_take(
    tokens: f64,
    last_refill_ms: i64,
    now_ms: i64,
    capacity: f64,
    refill_rate: f64,
) -> (bool, f64) {
    let elapsed_ms = (now_ms - last_refill_ms).max(0) as f64;
    let refilled = (tokens + elapsed_ms / 1000.0 * refill_rate).min(capacity);

    if refilled >= 1.0 {
        (true, refilled - 1.0)
    } else {
        (false, refilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_bounded_by_capacity() {
        // 1000 attempts with no time passing: exactly `capacity` admitted.
        let capacity = 50.0;
        let mut tokens = capacity;
        let mut admitted = 0;

        for _ in 0..1000 {
            let (ok, remaining) = refill_and_take(tokens, 0, 0, capacity, 5.0);
            tokens = remaining;
            if ok {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 50);
    }

    #[test]
    fn test_refill_restores_admission() {
        let capacity = 2.0;
        let (_, tokens) = refill_and_take(1.0, 0, 0, capacity, 5.0);
        let (ok, tokens) = refill_and_take(tokens, 0, 0, capacity, 5.0);
        assert!(!ok);

        // 400ms at 5 tokens/sec refills 2 tokens, capped at capacity.
        let (ok, _) = refill_and_take(tokens, 0, 400, capacity, 5.0);
        assert!(ok);
    }

    #[test]
    fn test_refill_capped_at_capacity() {
        let (_, tokens) = refill_and_take(50.0, 0, 3_600_000, 50.0, 5.0);
        // One hour of refill cannot exceed capacity minus the taken token.
        assert_eq!(tokens, 49.0);
    }

    #[test]
    fn test_admissions_never_exceed_capacity_plus_refill() {
        // Over any simulated window, admitted <= capacity + rate * elapsed.
        let capacity = 50.0;
        let rate = 5.0;
        let mut tokens = capacity;
        let mut last_refill = 0i64;
        let mut admitted = 0u64;

        for now in (0..10_000).step_by(10) {
            let (ok, remaining) = refill_and_take(tokens, last_refill, now, capacity, rate);
            tokens = remaining;
            last_refill = now;
            if ok {
                admitted += 1;
            }
        }

        let elapsed_secs = 10.0;
        assert!(admitted as f64 <= capacity + rate * elapsed_secs);
    }

    #[test]
    fn test_rejection_does_not_deduct() {
        let (ok, tokens) = refill_and_take(0.5, 0, 0, 50.0, 5.0);
        assert!(!ok);
        assert_eq!(tokens, 0.5);
    }
}
