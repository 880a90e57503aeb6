//! Redirect resolution pipeline (cache orchestrator).
//!
//! Resolves a short code to a terminal outcome through an ordered chain of
//! cache tiers before touching durable storage: ban check, negative cache,
//! positive cache, database fallback, then activity / expiry / password
//! gates and fire-and-forget click accounting.
//!
//! Failure policy: cache-tier errors are absorbed here, per call site — a
//! failed ban or negative lookup fails open (the request proceeds), a failed
//! positive lookup degrades to a database hit, and failed cache writes are
//! logged and dropped. Only a durable-storage failure propagates.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{BanCache, CachedLink, ClickCache, LinkCache, NegativeCache};
use crate::utils::password::verify_password;

/// Terminal outcome of a redirect resolution.
///
/// The HTTP layer maps these to status codes; the pipeline itself is
/// transport-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectOutcome {
    Redirect(String),
    NotFound,
    Gone,
    Forbidden,
    Unauthorized { password_required: bool },
}

/// The redirect pipeline over its cache tiers and durable fallback.
pub struct RedirectService {
    ban_cache: Arc<dyn BanCache>,
    negative_cache: Arc<dyn NegativeCache>,
    link_cache: Arc<dyn LinkCache>,
    click_cache: Arc<dyn ClickCache>,
    links: Arc<dyn LinkRepository>,
}

impl RedirectService {
    pub fn new(
        ban_cache: Arc<dyn BanCache>,
        negative_cache: Arc<dyn NegativeCache>,
        link_cache: Arc<dyn LinkCache>,
        click_cache: Arc<dyn ClickCache>,
        links: Arc<dyn LinkRepository>,
    ) -> Self {
        Self {
            ban_cache,
            negative_cache,
            link_cache,
            click_cache,
            links,
        }
    }

    /// Resolves a short code for a (hashed) caller identity.
    ///
    /// `password` is the caller-supplied password for protected links, if
    /// any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] only when the durable lookup itself
    /// fails; every cache-tier failure is absorbed per the policy above.
    pub async fn resolve(
        &self,
        code: &str,
        ip_hash: &str,
        password: Option<&str>,
    ) -> Result<RedirectOutcome, AppError> {
        // 1. Ban check. A ban-cache failure fails open: better to serve a
        // banned client briefly than to drop all traffic with the store.
        match self.ban_cache.is_banned(ip_hash).await {
            Ok(true) => return Ok(RedirectOutcome::Forbidden),
            Ok(false) => {}
            Err(e) => warn!("ban cache check failed, failing open: {}", e),
        }

        // 2. Negative cache: a fresh tombstone answers without touching the
        // database. A lookup failure is treated as a miss.
        match self.negative_cache.contains(code).await {
            Ok(true) => return Ok(RedirectOutcome::NotFound),
            Ok(false) => {}
            Err(e) => warn!("negative cache check failed, treating as miss: {}", e),
        }

        // 3. Positive cache. Corrupt entries are already self-healed to a
        // miss inside the tier; an outright store failure degrades to a
        // database hit.
        let cached = match self.link_cache.get(code).await {
            Ok(link) => link,
            Err(e) => {
                warn!("link cache read failed, falling back to database: {}", e);
                None
            }
        };

        // 4. Durable fallback on miss, populating the caches on the way out.
        let link = match cached {
            Some(link) => link,
            None => match self.links.find_active_by_code(code).await? {
                Some(row) => {
                    let link = CachedLink::from(&row);
                    if let Err(e) = self.link_cache.set(code, &link).await {
                        warn!("link cache write failed: {}", e);
                    }
                    link
                }
                None => {
                    if let Err(e) = self.negative_cache.mark(code).await {
                        warn!("negative cache write failed: {}", e);
                    }
                    return Ok(RedirectOutcome::NotFound);
                }
            },
        };

        // 5. Activity check. The stale cache entry is deliberately left in
        // place; it ages out by TTL (see DESIGN notes on this asymmetry).
        if !link.is_active {
            return Ok(RedirectOutcome::Gone);
        }

        // 6. Expiry check, self-correcting the cache.
        if link.expires_at.is_some_and(|e| e < chrono::Utc::now()) {
            if let Err(e) = self.link_cache.invalidate(code).await {
                warn!("link cache invalidation failed for expired {}: {}", code, e);
            }
            return Ok(RedirectOutcome::Gone);
        }

        // 7. Password gate: distinguish "not supplied" from "wrong".
        if let Some(hash) = &link.password_hash {
            let Some(password) = password else {
                return Ok(RedirectOutcome::Unauthorized {
                    password_required: true,
                });
            };
            if !verify_password(password, hash) {
                return Ok(RedirectOutcome::Unauthorized {
                    password_required: false,
                });
            }
        }

        // 8. Click accounting, fire-and-forget: never blocks or fails the
        // redirect.
        let click_cache = Arc::clone(&self.click_cache);
        let link_id = link.id;
        tokio::spawn(async move {
            if let Err(e) = click_cache.increment(link_id).await {
                error!("click counter increment failed for link {}: {}", link_id, e);
            }
        });

        // 9. Success.
        Ok(RedirectOutcome::Redirect(link.original_url))
    }
}
