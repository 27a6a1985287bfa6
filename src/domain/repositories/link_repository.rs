//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Keyed store of link records, addressed by code.
///
/// Uniqueness of `code` and the atomicity of [`Self::record_click`] are the
/// store's responsibility; callers never emulate them with read-then-write.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process map
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Prepares the store for use (schema, connection).
    ///
    /// Must be safe to call more than once and from several processes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be reached.
    async fn initialize(&self) -> Result<(), AppError>;

    /// Inserts a new record with `clicks = 0` and no last click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeConflict`] if the code is already taken.
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on store errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically increments `clicks` and advances `last_clicked_at`.
    ///
    /// Returns the updated record, or `Ok(None)` if no record has this code.
    /// Concurrent calls on the same code must all be reflected.
    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError>;

    /// Removes a link.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none existed.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Lists every link, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Cheap round-trip used by health checks.
    async fn ping(&self) -> Result<(), AppError>;
}
