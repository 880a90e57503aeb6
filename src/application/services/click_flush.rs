//! Periodic rollup of cached click counters into durable storage.
//!
//! Redirects count clicks with a cheap cache increment; this worker sweeps
//! the pending counters on an interval and folds them into the daily stats
//! table. A counter is deleted only after its durable write commits, so a
//! crash between write and delete double-counts at most one sweep rather
//! than losing clicks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::repositories::StatsRepository;
use crate::error::AppError;
use crate::infrastructure::cache::ClickCache;

/// Flushes all pending click counters once.
///
/// Counters that fail to persist are left in the cache for the next sweep.
/// Returns the number of counters flushed.
///
/// # Errors
///
/// Returns the cache error when the pending scan itself fails; per-counter
/// persistence failures are logged and skipped.
pub async fn flush_pending(
    click_cache: &dyn ClickCache,
    stats: &dyn StatsRepository,
) -> Result<usize, AppError> {
    let pending = click_cache
        .list_pending()
        .await
        .map_err(|e| AppError::unavailable(format!("click counter scan failed: {e}")))?;

    let mut flushed = 0;
    for counter in pending {
        if counter.count <= 0 {
            continue;
        }

        if let Err(e) = stats
            .add_daily_clicks(counter.link_id, counter.date, counter.count)
            .await
        {
            error!(
                "click flush failed for link {} on {}: {:?}",
                counter.link_id, counter.date, e
            );
            continue;
        }

        // Delete only after the durable write; a failure here means one
        // extra flush of the same counter, never a lost click.
        if let Err(e) = click_cache.delete(counter.link_id, counter.date).await {
            error!(
                "click counter delete failed for link {} on {}: {}",
                counter.link_id, counter.date, e
            );
            continue;
        }

        flushed += 1;
    }

    Ok(flushed)
}

/// Runs the flush loop until the process exits.
pub async fn run_click_flush_worker(
    click_cache: Arc<dyn ClickCache>,
    stats: Arc<dyn StatsRepository>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("click flush worker started (every {}s)", interval_secs);
    loop {
        interval.tick().await;
        match flush_pending(click_cache.as_ref(), stats.as_ref()).await {
            Ok(0) => {}
            Ok(n) => info!("flushed {} click counters", n),
            Err(e) => error!("click flush sweep failed: {:?}", e),
        }
    }
}
