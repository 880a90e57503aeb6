//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    password_hash: Option<String>,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            short_code: row.short_code,
            original_url: row.original_url,
            is_active: row.is_active,
            expires_at: row.expires_at,
            password_hash: row.password_hash,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, is_active, expires_at,
                   password_hash, user_id, created_at
            FROM links
            WHERE short_code = $1
              AND is_active = true
              AND (expires_at IS NULL OR expires_at > now())
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Link::from))
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (short_code, original_url, user_id, expires_at, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, short_code, original_url, is_active, expires_at,
                      password_hash, user_id, created_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .bind(new_link.user_id)
        .bind(new_link.expires_at)
        .bind(&new_link.password_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
