//! Repository trait for daily click statistics.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository interface for the daily click rollup.
///
/// Consumed by the click-flush worker, which drains the per-day counters the
/// redirect path accumulates in the shared store and makes them durable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Adds `count` clicks to the daily stats row for `(link_id, date)`,
    /// creating it if absent, and bumps the link's running total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn add_daily_clicks(
        &self,
        link_id: i64,
        date: NaiveDate,
        count: i64,
    ) -> Result<(), AppError>;
}
