//! Distributed admission control over the shared store.
//!
//! Four interchangeable strategies, each exposing the same [`RateLimiter`]
//! contract. All limiter state lives in Redis; instances hold nothing but
//! their parameters and a connection handle, so any number of service
//! replicas can share one logical limit per client key.
//!
//! Strategy selection is per call site, not a meta-policy of the engine:
//! redirect traffic uses the token bucket, link creation the sliding window
//! counter, auth-style endpoints the sliding window log.
//!
//! Every correctness-critical read-then-write runs as a single atomic unit
//! against the store (a `MULTI`/`EXEC` pipeline or a Lua script), never as
//! separate get/compute/set round trips.

pub mod fixed_window;
pub mod sliding_counter;
pub mod sliding_log;
pub mod token_bucket;

pub use fixed_window::FixedWindowLimiter;
pub use sliding_counter::SlidingWindowCounterLimiter;
pub use sliding_log::SlidingWindowLogLimiter;
pub use token_bucket::TokenBucketLimiter;

use async_trait::async_trait;

/// Errors that can occur during an admission check.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit store error: {0}")]
    Store(String),
}

impl From<redis::RedisError> for RateLimitError {
    fn from(e: redis::RedisError) -> Self {
        RateLimitError::Store(e.to_string())
    }
}

/// Uniform admission check over any strategy.
///
/// `is_allowed` costs one round trip (or one scripted call) to the shared
/// store and never retries internally. A store failure surfaces as
/// [`RateLimitError`]; the caller decides whether to fail open or closed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn is_allowed(&self, client_key: &str) -> Result<bool, RateLimitError>;
}
