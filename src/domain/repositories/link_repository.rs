//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// The redirect hot path only ever calls [`LinkRepository::find_active_by_code`],
/// and only on a cache miss; everything else belongs to the creation path.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds an active, non-expired link by its short code.
    ///
    /// The activity and expiry filters live in the query itself, so a link
    /// that was deactivated or expired after being cached is only caught by
    /// the pipeline's own checks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists
    /// (which the key generation service should make impossible) and
    /// [`AppError::Internal`] on other database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;
}
