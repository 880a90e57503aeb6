//! PostgreSQL implementation of the daily click rollup.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::StatsRepository;
use crate::error::{AppError, map_sqlx_error};

/// PostgreSQL repository for daily click statistics.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn add_daily_clicks(
        &self,
        link_id: i64,
        date: NaiveDate,
        count: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO link_daily_stats (link_id, stat_date, clicks)
            VALUES ($1, $2, $3)
            ON CONFLICT (link_id, stat_date)
            DO UPDATE SET clicks = link_daily_stats.clicks + EXCLUDED.clicks
            "#,
        )
        .bind(link_id)
        .bind(date)
        .bind(count)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("UPDATE links SET total_clicks = total_clicks + $1 WHERE id = $2")
            .bind(count)
            .bind(link_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
