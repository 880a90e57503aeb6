//! Key generation service: pre-minted, globally unique short codes.
//!
//! Each service instance keeps an in-process pool of encoded codes and
//! refills it by atomically reserving a numeric range from the durable
//! counter. Ranges are disjoint across instances, so uniqueness holds with
//! no distributed lock; batching amortizes the durable round trip over
//! `batch_size` codes.
//!
//! Lifecycle: `Uninitialized -> Ready -> ShuttingDown`. [`KeygenService::start`]
//! performs the initial reservation and fails the instance if it cannot;
//! [`KeygenService::shutdown`] freezes the pool: draining is still allowed,
//! refills are refused.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::repositories::CounterRepository;
use crate::error::AppError;
use crate::utils::codec;

/// Errors surfaced to callers asking for a key.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeygenError {
    /// No key can be handed out right now: the service is not started, the
    /// pool is empty (possibly mid-refill), or shutdown has begun with the
    /// pool drained. Callers should fail fast and retry the whole request.
    #[error("key generation service unavailable")]
    Unavailable,
}

/// Per-instance key pool over the shared durable counter.
pub struct KeygenService {
    counter: Arc<dyn CounterRepository>,
    batch_size: i64,
    refill_threshold: f64,
    pool: Mutex<Vec<String>>,
    initialized: AtomicBool,
    refilling: AtomicBool,
    shutting_down: AtomicBool,
}

impl KeygenService {
    pub fn new(
        counter: Arc<dyn CounterRepository>,
        batch_size: i64,
        refill_threshold: f64,
    ) -> Arc<Self> {
        Arc::new(Self {
            counter,
            batch_size,
            refill_threshold,
            pool: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
            refilling: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Performs the initial range reservation and marks the service Ready.
    ///
    /// # Errors
    ///
    /// Propagates the reservation failure; an instance that cannot obtain
    /// its first batch must not come up.
    pub async fn start(&self) -> Result<(), AppError> {
        self.refill().await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!("key generation service ready (batch size {})", self.batch_size);
        Ok(())
    }

    /// Freezes the pool: pooled keys may still drain, refills become no-ops.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        info!("key generation service shutting down; pool will drain without refill");
    }

    /// Pops one code from the pool.
    ///
    /// Codes are interchangeable; uniqueness is the only requirement, so pop
    /// order is irrelevant. When the remaining depth falls below
    /// `batch_size * refill_threshold`, a background refill is spawned
    /// without blocking the caller; its failure is logged, never surfaced
    /// (the next low-watermark crossing retries naturally).
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::Unavailable`] before `start()` completes or
    /// when the pool is empty, including while a refill is still in flight;
    /// callers fail fast instead of blocking on the store.
    pub async fn next_key(self: &Arc<Self>) -> Result<String, KeygenError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(KeygenError::Unavailable);
        }

        let (key, depth) = {
            let mut pool = self.pool.lock().await;
            let key = pool.pop();
            (key, pool.len())
        };

        let key = key.ok_or(KeygenError::Unavailable)?;

        let low_watermark = (self.batch_size as f64 * self.refill_threshold) as usize;
        if depth < low_watermark && !self.shutting_down.load(Ordering::SeqCst) {
            let service = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = service.refill().await {
                    warn!("background key refill failed: {:?}", e);
                }
            });
        }

        Ok(key)
    }

    /// Reserves one range and appends the encoded batch to the pool.
    ///
    /// Guarded by the `refilling` flag: at most one refill is in flight per
    /// instance, re-entrant calls are no-ops. Refills during shutdown are
    /// also no-ops.
    ///
    /// # Errors
    ///
    /// Returns the reservation error; the pool simply does not advance.
    pub async fn refill(&self) -> Result<(), AppError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Ok(());
        }

        if self
            .refilling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refill already in flight, skipping");
            return Ok(());
        }

        let result = self.reserve_and_encode().await;
        self.refilling.store(false, Ordering::SeqCst);
        result
    }

    async fn reserve_and_encode(&self) -> Result<(), AppError> {
        let (start, end) = self.counter.reserve_range(self.batch_size).await?;

        let batch: Vec<String> = (start..end).map(|id| codec::encode(id as u64)).collect();

        let mut pool = self.pool.lock().await;
        pool.extend(batch);
        debug!(
            "key pool refilled from range [{}, {}), depth now {}",
            start,
            end,
            pool.len()
        );

        Ok(())
    }

    /// Current pool depth, for health reporting.
    pub async fn pool_depth(&self) -> usize {
        self.pool.lock().await.len()
    }
}
