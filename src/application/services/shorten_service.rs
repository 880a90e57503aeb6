//! Link creation: validate, mint a code, persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::application::services::keygen_service::KeygenService;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::NegativeCache;
use crate::utils::password::hash_password;
use crate::utils::url_normalizer::{UrlNormalizationError, normalize_url};

/// Validated input for creating a link.
#[derive(Debug, Clone)]
pub struct ShortenRequest {
    pub original_url: String,
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub password: Option<String>,
}

/// Creates new short links on top of the key pool and durable storage.
pub struct ShortenService {
    keygen: Arc<KeygenService>,
    links: Arc<dyn LinkRepository>,
    negative_cache: Arc<dyn NegativeCache>,
}

impl ShortenService {
    pub fn new(
        keygen: Arc<KeygenService>,
        links: Arc<dyn LinkRepository>,
        negative_cache: Arc<dyn NegativeCache>,
    ) -> Self {
        Self {
            keygen,
            links,
            negative_cache,
        }
    }

    /// Creates a link: normalizes the destination, mints a code from the
    /// pool, and persists the row.
    ///
    /// The freshly minted code may have picked up a negative-cache tombstone
    /// from a pre-creation probe, so the tombstone is cleared after the
    /// insert; a failure there only delays visibility and is logged, not
    /// surfaced.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an invalid or disallowed destination
    ///   URL, or an expiry that is not in the future
    /// - [`AppError::Unavailable`] when the key pool cannot serve a code
    /// - database errors from the insert
    pub async fn shorten(&self, request: ShortenRequest) -> Result<Link, AppError> {
        let original_url = normalize_url(&request.original_url).map_err(|e| match e {
            UrlNormalizationError::InvalidFormat(msg) => {
                AppError::bad_request(format!("invalid URL: {msg}"), Value::Null)
            }
            UrlNormalizationError::UnsupportedScheme => AppError::bad_request(
                "only HTTP and HTTPS destinations are allowed",
                Value::Null,
            ),
        })?;

        if let Some(expires_at) = request.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "expiry must be in the future",
                Value::Null,
            ));
        }

        let password_hash = match &request.password {
            Some(password) => Some(
                hash_password(password)
                    .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?,
            ),
            None => None,
        };

        let short_code = self
            .keygen
            .next_key()
            .await
            .map_err(|_| AppError::unavailable("no short codes available, retry shortly"))?;

        let link = self
            .links
            .create(NewLink {
                short_code: short_code.clone(),
                original_url,
                user_id: request.user_id,
                expires_at: request.expires_at,
                password_hash,
            })
            .await?;

        // A probe for this code before creation may have left a tombstone.
        if let Err(e) = self.negative_cache.remove(&short_code).await {
            warn!("negative cache clear failed for new code {}: {}", short_code, e);
        }

        info!("created link {} -> {}", link.short_code, link.original_url);
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockCounterRepository, MockLinkRepository};
    use crate::infrastructure::cache::MockNegativeCache;
    use chrono::Duration;

    fn keygen() -> Arc<KeygenService> {
        let mut counter = MockCounterRepository::new();
        counter.expect_reserve_range().returning(|_| Ok((1, 11)));
        KeygenService::new(Arc::new(counter), 10, 0.2)
    }

    fn request(url: &str) -> ShortenRequest {
        ShortenRequest {
            original_url: url.to_string(),
            user_id: 7,
            expires_at: None,
            password: None,
        }
    }

    fn echoing_repo() -> MockLinkRepository {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().returning(|new_link| {
            Ok(Link {
                id: 1,
                short_code: new_link.short_code,
                original_url: new_link.original_url,
                is_active: true,
                expires_at: new_link.expires_at,
                password_hash: new_link.password_hash,
                user_id: new_link.user_id,
                created_at: Utc::now(),
            })
        });
        repo
    }

    #[tokio::test]
    async fn test_shorten_mints_code_and_persists() {
        let keygen = keygen();
        keygen.start().await.unwrap();
        let mut negative = MockNegativeCache::new();
        negative.expect_remove().times(1).returning(|_| Ok(()));
        let service = ShortenService::new(keygen, Arc::new(echoing_repo()), Arc::new(negative));

        let link = service
            .shorten(request("https://example.com/long/path"))
            .await
            .unwrap();
        assert!(!link.short_code.is_empty());
        assert_eq!(link.original_url, "https://example.com/long/path");
    }

    #[tokio::test]
    async fn test_shorten_rejects_bad_url_before_minting() {
        let keygen = keygen();
        keygen.start().await.unwrap();
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);
        let service =
            ShortenService::new(keygen.clone(), Arc::new(repo), Arc::new(MockNegativeCache::new()));

        let err = service.shorten(request("javascript:alert(1)")).await;
        assert!(matches!(err, Err(AppError::Validation { .. })));
        // No code was consumed for the rejected request.
        assert_eq!(keygen.pool_depth().await, 10);
    }

    #[tokio::test]
    async fn test_shorten_rejects_past_expiry() {
        let keygen = keygen();
        keygen.start().await.unwrap();
        let service = ShortenService::new(
            keygen,
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockNegativeCache::new()),
        );

        let mut req = request("https://example.com/");
        req.expires_at = Some(Utc::now() - Duration::minutes(1));
        assert!(matches!(
            service.shorten(req).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_shorten_hashes_password() {
        let keygen = keygen();
        keygen.start().await.unwrap();
        let mut negative = MockNegativeCache::new();
        negative.expect_remove().returning(|_| Ok(()));
        let service = ShortenService::new(keygen, Arc::new(echoing_repo()), Arc::new(negative));

        let mut req = request("https://example.com/");
        req.password = Some("sesame".to_string());
        let link = service.shorten(req).await.unwrap();

        let hash = link.password_hash.expect("hash stored");
        assert_ne!(hash, "sesame");
        assert!(crate::utils::password::verify_password("sesame", &hash));
    }

    #[tokio::test]
    async fn test_shorten_unavailable_when_pool_not_started() {
        let service = ShortenService::new(
            keygen(), // never started
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockNegativeCache::new()),
        );

        assert!(matches!(
            service.shorten(request("https://example.com/")).await,
            Err(AppError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_cache_failure_does_not_fail_creation() {
        let keygen = keygen();
        keygen.start().await.unwrap();
        let mut negative = MockNegativeCache::new();
        negative.expect_remove().returning(|_| {
            Err(crate::infrastructure::cache::CacheError::Operation(
                "store down".to_string(),
            ))
        });
        let service = ShortenService::new(keygen, Arc::new(echoing_repo()), Arc::new(negative));

        assert!(service.shorten(request("https://example.com/")).await.is_ok());
    }
}
