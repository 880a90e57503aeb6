//! HTTP server initialization and runtime setup.
//!
//! Wires the connection pools, cache tiers, rate limiters, and services,
//! spawns the background workers, and runs the Axum server until shutdown.

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    KeygenService, RedirectService, ShortenService, click_flush::run_click_flush_worker,
};
use crate::config::Config;
use crate::infrastructure::cache::{
    self, RedisBanCache, RedisClickCache, RedisLinkCache, RedisNegativeCache,
};
use crate::infrastructure::persistence::{
    PgCounterRepository, PgLinkRepository, PgStatsRepository,
};
use crate::infrastructure::ratelimit::{
    SlidingWindowCounterLimiter, SlidingWindowLogLimiter, TokenBucketLimiter,
};
use crate::api::routes::app_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if the database or Redis connection fails, migrations
/// fail, the key pool cannot obtain its first batch, or the bind fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    // The shared store is load-bearing here (rate limits, ban list, caches),
    // so unlike a pure look-aside cache there is no null fallback.
    let redis = cache::connect(&config.redis_url).await?;
    tracing::info!("Connected to Redis");

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let counter_repository = Arc::new(PgCounterRepository::new(pool.clone()));
    let stats_repository = Arc::new(PgStatsRepository::new(pool.clone()));

    let ban_cache = Arc::new(RedisBanCache::new(redis.clone()));
    let negative_cache = Arc::new(RedisNegativeCache::new(
        redis.clone(),
        config.negative_ttl_secs,
    ));
    let link_cache = Arc::new(RedisLinkCache::new(
        redis.clone(),
        config.link_ttl_floor_secs,
        config.link_ttl_cap_secs,
    ));
    let click_cache = Arc::new(RedisClickCache::new(redis.clone()));

    let keygen = KeygenService::new(
        counter_repository,
        config.kgs_batch_size,
        config.kgs_refill_threshold,
    );
    keygen.start().await.map_err(|e| {
        anyhow::anyhow!("key generation service failed to start: {:?}", e)
    })?;

    let redirect_service = Arc::new(RedirectService::new(
        ban_cache.clone(),
        negative_cache.clone(),
        link_cache.clone(),
        click_cache.clone(),
        link_repository.clone(),
    ));
    let shorten_service = Arc::new(ShortenService::new(
        keygen.clone(),
        link_repository,
        negative_cache,
    ));

    tokio::spawn(run_click_flush_worker(
        click_cache,
        stats_repository,
        config.click_flush_interval_secs,
    ));
    tracing::info!("Click flush worker started");

    let state = AppState {
        redirect_service,
        shorten_service,
        keygen: keygen.clone(),
        ban_cache,
        redirect_limiter: Arc::new(TokenBucketLimiter::new(
            redis.clone(),
            config.redirect_bucket_capacity,
            config.redirect_refill_rate,
        )),
        create_limiter: Arc::new(SlidingWindowCounterLimiter::new(
            redis.clone(),
            config.create_window_ms,
            config.create_limit,
        )),
        admin_limiter: Arc::new(SlidingWindowLogLimiter::new(
            redis,
            config.auth_window_ms,
            config.auth_limit,
        )),
        ip_hash_salt: config.ip_hash_salt.clone(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop handing out codes; in-flight requests may still drain the pool.
    keygen.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
