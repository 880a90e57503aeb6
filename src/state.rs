//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::{KeygenService, RedirectService, ShortenService};
use crate::infrastructure::cache::BanCache;
use crate::infrastructure::ratelimit::RateLimiter;

/// Handler-facing view of the wired application.
///
/// Limiters are trait objects chosen per call site at wiring time: redirect
/// traffic gets the token bucket, link creation the sliding window counter,
/// the admin surface the sliding window log.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub shorten_service: Arc<ShortenService>,
    pub keygen: Arc<KeygenService>,
    pub ban_cache: Arc<dyn BanCache>,
    pub redirect_limiter: Arc<dyn RateLimiter>,
    pub create_limiter: Arc<dyn RateLimiter>,
    pub admin_limiter: Arc<dyn RateLimiter>,
    /// Salt for hashing client IPs before they become store keys.
    pub ip_hash_salt: String,
}
