//! Handler for the link creation endpoint.

use axum::{
    Json,
    extract::{ConnectInfo, State},
};
use std::net::SocketAddr;
use tracing::warn;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ip_hash::hash_ip;

/// Anonymous creations are attributed to this synthetic account.
const ANONYMOUS_USER_ID: i64 = 0;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// Gated by the sliding-window-counter limiter keyed on the client IP hash;
/// a limiter store failure fails open.
///
/// # Errors
///
/// - 400 for an invalid destination URL or past expiry
/// - 429 when the creation limit is exhausted
/// - 503 when no short codes are available
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    let ip = addr.ip().to_string();
    let ip_hash = hash_ip(Some(&ip), &state.ip_hash_salt);

    match state.create_limiter.is_allowed(&ip_hash).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::RateLimited),
        Err(e) => warn!("creation limiter unavailable, failing open: {}", e),
    }

    let link = state
        .shorten_service
        .shorten(services::ShortenRequest {
            original_url: payload.url,
            user_id: ANONYMOUS_USER_ID,
            expires_at: payload.expires_at,
            password: payload.password,
        })
        .await?;

    Ok(Json(ShortenResponse {
        code: link.short_code,
        original_url: link.original_url,
        expires_at: link.expires_at,
        password_protected: link.password_hash.is_some(),
    }))
}
