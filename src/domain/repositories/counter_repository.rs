//! Repository trait for the durable short-code counter.

use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the global monotonic code counter.
///
/// The counter is the only cross-instance coordination point of the key
/// generation service: each instance reserves a disjoint numeric range with a
/// single atomic fetch-and-add, so codes never collide no matter how many
/// instances run concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Atomically reserves `count` consecutive ids.
    ///
    /// Returns the half-open range `[start, end)`. Ranges handed to distinct
    /// callers never overlap, regardless of concurrency.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the counter row is missing or the
    /// update fails.
    async fn reserve_range(&self, count: i64) -> Result<(i64, i64), AppError>;
}
