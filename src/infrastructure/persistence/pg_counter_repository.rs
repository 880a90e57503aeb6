//! PostgreSQL implementation of the global code counter.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::repositories::CounterRepository;
use crate::error::{AppError, map_sqlx_error};

/// PostgreSQL-backed monotonic counter.
///
/// A single-row table holds `next_id`; reservation is one `UPDATE ..
/// RETURNING`, so the database's row lock is the only serialization point
/// and two callers can never see overlapping ranges.
pub struct PgCounterRepository {
    pool: Arc<PgPool>,
}

impl PgCounterRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterRepository for PgCounterRepository {
    async fn reserve_range(&self, count: i64) -> Result<(i64, i64), AppError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE short_code_counter
            SET next_id = next_id + $1
            WHERE id = 1
            RETURNING next_id - $1 AS start, next_id AS "end"
            "#,
        )
        .bind(count)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let (start, end) = row.ok_or_else(|| {
            AppError::internal("short_code_counter row missing; cannot reserve a code range")
        })?;

        debug!("reserved code range [{}, {})", start, end);
        Ok((start, end))
    }
}
