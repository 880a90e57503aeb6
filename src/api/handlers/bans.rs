//! Handlers for the ban administration endpoints.
//!
//! These write the same ban cache the redirect pipeline reads. The surface
//! is operator-facing and low-volume, so its limiter (sliding window log)
//! fails closed: when the store is down we would rather refuse an admin
//! action than lose the brute-force bound.

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
};
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::api::dto::ban::{BanRequest, BanResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ip_hash::hash_ip;

async fn check_admin_limit(state: &AppState, addr: SocketAddr) -> Result<(), AppError> {
    let ip = addr.ip().to_string();
    let caller_hash = hash_ip(Some(&ip), &state.ip_hash_salt);

    match state.admin_limiter.is_allowed(&caller_hash).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::RateLimited),
        Err(e) => {
            warn!("admin limiter unavailable, failing closed: {}", e);
            Err(AppError::unavailable("admission control unavailable"))
        }
    }
}

/// Bans a client IP until the given time.
///
/// # Endpoint
///
/// `POST /api/bans`
pub async fn ban_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<BanRequest>,
) -> Result<Json<BanResponse>, AppError> {
    check_admin_limit(&state, addr).await?;

    let ip_hash = hash_ip(Some(&payload.ip), &state.ip_hash_salt);
    state
        .ban_cache
        .ban(&ip_hash, payload.banned_until, &payload.reason)
        .await
        .map_err(|e| AppError::internal(format!("ban write failed: {e}")))?;

    info!("banned {} until {}: {}", ip_hash, payload.banned_until, payload.reason);
    Ok(Json(BanResponse {
        ip_hash,
        banned_until: payload.banned_until,
    }))
}

/// Lifts a ban immediately.
///
/// # Endpoint
///
/// `DELETE /api/bans/{ip}`
pub async fn unban_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(ip): Path<String>,
) -> Result<StatusCode, AppError> {
    check_admin_limit(&state, addr).await?;

    let ip_hash = hash_ip(Some(&ip), &state.ip_hash_salt);
    state
        .ban_cache
        .unban(&ip_hash)
        .await
        .map_err(|e| AppError::internal(format!("unban failed: {e}")))?;

    info!("unbanned {}", ip_hash);
    Ok(StatusCode::NO_CONTENT)
}
