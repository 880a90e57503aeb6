//! Router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`          - Short link redirect (public)
//! - `GET  /health`          - Liveness and key pool depth (public)
//! - `POST /api/shorten`     - Link creation
//! - `POST /api/bans`        - Ban a client IP
//! - `DELETE /api/bans/{ip}` - Lift a ban
//!
//! Rate limiting is enforced inside the handlers rather than as a layer: the
//! strategy and the fail-open/fail-closed policy differ per endpoint.

use axum::Router;
use axum::routing::{delete, get, post};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{ban_handler, health_handler, redirect_handler, shorten_handler, unban_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/bans", post(ban_handler))
        .route("/bans/{ip}", delete(unban_handler));

    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
