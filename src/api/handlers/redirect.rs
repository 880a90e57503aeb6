//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::warn;

use crate::application::services::RedirectOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ip_hash::hash_ip;

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// Password for protected links.
    pub password: Option<String>,
}

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}?password=...`
///
/// Admission control runs first (token bucket per client IP hash); a limiter
/// store failure fails open so a degraded Redis never blackholes redirect
/// traffic. The resolution pipeline then decides the terminal outcome.
///
/// # Errors
///
/// - 403 for banned clients, 404 unknown code, 410 inactive or expired,
///   401 for password-protected links, 429 when rate limited
pub async fn redirect_handler(
    Path(code): Path<String>,
    Query(query): Query<RedirectQuery>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let ip_hash = hash_ip(Some(&ip), &state.ip_hash_salt);

    match state.redirect_limiter.is_allowed(&ip_hash).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::RateLimited),
        Err(e) => warn!("redirect limiter unavailable, failing open: {}", e),
    }

    let outcome = state
        .redirect_service
        .resolve(&code, &ip_hash, query.password.as_deref())
        .await?;

    match outcome {
        RedirectOutcome::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        RedirectOutcome::NotFound => Err(AppError::not_found("Short link not found")),
        RedirectOutcome::Gone => Err(AppError::gone("Link is no longer available")),
        RedirectOutcome::Forbidden => Err(AppError::Forbidden),
        RedirectOutcome::Unauthorized { password_required } => {
            Err(AppError::Unauthorized { password_required })
        }
    }
}
