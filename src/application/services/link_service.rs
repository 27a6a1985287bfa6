//! Link registry: code allocation, resolution and click accounting.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::validation::{is_valid_code, is_valid_url};

/// Upper bound on generated candidates tried for one allocation.
///
/// Probe hits and unique violations on insert both count against it.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 10;

/// Default deadline for a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// The link-code registry.
///
/// Owns the lifecycle of every [`Link`]: allocation of unique codes,
/// resolution with click accounting, reads and deletion. The only in-process
/// state is the one-shot store initializer; everything else lives in the
/// repository, which is the single source of truth across processes.
///
/// Generic over the repository so unit tests can use a concrete mock; the
/// server uses the default `dyn LinkRepository` to pick a backend at runtime.
pub struct LinkService<L: LinkRepository + ?Sized = dyn LinkRepository> {
    link_repository: Arc<L>,
    store_timeout: Duration,
    initialized: OnceCell<()>,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service with the default store deadline.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self {
            link_repository,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            initialized: OnceCell::new(),
        }
    }

    /// Overrides the per-round-trip store deadline.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Prepares the store once per process.
    ///
    /// Safe to call from several entry points at once: one caller runs the
    /// repository initializer and the others wait for its outcome. A failed
    /// attempt leaves the service uninitialized so a later call retries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be reached.
    pub async fn initialize(&self) -> Result<(), AppError> {
        self.initialized
            .get_or_try_init(|| async {
                self.with_deadline("initialize", self.link_repository.initialize())
                    .await?;
                info!("Link store initialized");
                Ok::<(), AppError>(())
            })
            .await
            .map(|_| ())
    }

    /// Creates a short link, allocating a code unless `custom_code` is given.
    ///
    /// # Code Allocation
    ///
    /// - A custom code is validated, probed and inserted; any collision is a conflict
    /// - Otherwise random codes are generated and probed, up to
    ///   [`MAX_ALLOCATION_ATTEMPTS`] candidates in total
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidUrl`] / [`AppError::InvalidCode`] before
    /// touching the store.
    /// Returns [`AppError::CodeConflict`] if the custom code is taken.
    /// Returns [`AppError::AllocationExhausted`] if every candidate collided.
    pub async fn create_link(
        &self,
        target_url: String,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        if !is_valid_url(&target_url) {
            return Err(AppError::invalid_url(
                "Invalid URL. Must be a valid http:// or https:// URL",
                json!({ "url": target_url }),
            ));
        }

        if let Some(code) = &custom_code
            && !is_valid_code(code)
        {
            return Err(AppError::invalid_code(
                "Custom code must be 6-8 alphanumeric characters",
                json!({ "code": code }),
            ));
        }

        self.initialize().await?;

        let link = match custom_code {
            Some(code) => self.insert_custom(target_url, code).await?,
            None => self.allocate(target_url).await?,
        };

        info!(code = %link.code, "Link created");
        Ok(link)
    }

    /// Resolves a code to its target URL, recording one click.
    ///
    /// The click is committed before this returns, so a successful resolution
    /// is always reflected in the stored counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code; nothing is mutated.
    pub async fn resolve(&self, code: &str) -> Result<(String, Link), AppError> {
        let link = self.record_click(code).await?;
        debug!(code, clicks = link.clicks, "Link resolved");

        Ok((link.target_url.clone(), link))
    }

    /// Adds one click to the record and stamps the click time.
    ///
    /// The increment is a single atomic store update, never a read followed
    /// by a write, so concurrent clicks on a hot code are not lost. The update
    /// only applies to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn record_click(&self, code: &str) -> Result<Link, AppError> {
        self.initialize().await?;
        let clicked_at = Utc::now();

        self.with_deadline(
            "record_click",
            self.link_repository.record_click(code, clicked_at),
        )
        .await?
        .ok_or_else(|| not_found(code))
    }

    /// Retrieves a link without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.initialize().await?;

        self.with_deadline("find_by_code", self.link_repository.find_by_code(code))
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Lists all links, newest first. Every call re-reads the store.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.initialize().await?;

        self.with_deadline("list_all", self.link_repository.list_all())
            .await
    }

    /// Removes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code, including when
    /// it was already deleted.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        self.initialize().await?;

        let deleted = self
            .with_deadline("delete", self.link_repository.delete(code))
            .await?;

        if !deleted {
            return Err(not_found(code));
        }

        info!(code, "Link deleted");
        Ok(())
    }

    /// Checks that the store answers within the deadline.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.with_deadline("ping", self.link_repository.ping()).await
    }

    async fn insert_custom(&self, target_url: String, code: String) -> Result<Link, AppError> {
        let existing = self
            .with_deadline("find_by_code", self.link_repository.find_by_code(&code))
            .await?;

        if existing.is_some() {
            return Err(conflict(&code));
        }

        // A concurrent creator may take the code between probe and insert.
        match self
            .with_deadline(
                "insert",
                self.link_repository
                    .insert(NewLink::new(code.clone(), target_url)),
            )
            .await
        {
            Err(AppError::CodeConflict { .. }) => Err(conflict(&code)),
            other => other,
        }
    }

    async fn allocate(&self, target_url: String) -> Result<Link, AppError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = generate_code();

            let existing = self
                .with_deadline("find_by_code", self.link_repository.find_by_code(&code))
                .await?;

            if existing.is_some() {
                debug!(attempt, code, "Generated code already taken");
                continue;
            }

            match self
                .with_deadline(
                    "insert",
                    self.link_repository
                        .insert(NewLink::new(code.clone(), target_url.clone())),
                )
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::CodeConflict { .. }) => {
                    debug!(attempt, code, "Generated code taken during insert");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = MAX_ALLOCATION_ATTEMPTS,
            "Could not allocate a unique code"
        );
        Err(AppError::allocation_exhausted(
            "Failed to generate unique code",
            json!({ "attempts": MAX_ALLOCATION_ATTEMPTS }),
        ))
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Store round-trip timed out"
                );
                Err(AppError::store_unavailable(
                    "Store did not respond in time",
                    json!({ "operation": operation }),
                ))
            }
        }
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Link not found", json!({ "code": code }))
}

fn conflict(code: &str) -> AppError {
    AppError::conflict("Code already exists", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use async_trait::async_trait;
    use chrono::DateTime;
    use mockall::Sequence;

    fn create_test_link(code: &str, url: &str) -> Link {
        Link::new(code.to_string(), url.to_string(), 0, None, Utc::now())
    }

    fn mock_repo() -> MockLinkRepository {
        let mut mock = MockLinkRepository::new();
        mock.expect_initialize().times(1).returning(|| Ok(()));
        mock
    }

    #[tokio::test]
    async fn test_create_link_generates_code() {
        let mut mock = mock_repo();

        mock.expect_find_by_code().times(1).returning(|_| Ok(None));
        mock.expect_insert()
            .withf(|new_link| is_valid_code(&new_link.code))
            .times(1)
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = LinkService::new(Arc::new(mock));

        let link = service
            .create_link("https://example.com".to_string(), None)
            .await
            .unwrap();

        assert!(is_valid_code(&link.code));
        assert_eq!(link.target_url, "https://example.com");
        assert_eq!(link.clicks, 0);
        assert!(link.last_clicked_at.is_none());
    }

    #[tokio::test]
    async fn test_create_link_invalid_url_skips_store() {
        let mut mock = MockLinkRepository::new();
        mock.expect_initialize().times(0);
        mock.expect_find_by_code().times(0);
        mock.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock));

        for url in ["", "not-a-url", "ftp://x"] {
            let result = service.create_link(url.to_string(), None).await;
            assert!(
                matches!(result, Err(AppError::InvalidUrl { .. })),
                "expected InvalidUrl for {url:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_link_invalid_code_skips_store() {
        let mut mock = MockLinkRepository::new();
        mock.expect_initialize().times(0);
        mock.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock));

        for code in ["ab", "toolongcode123", "has space"] {
            let result = service
                .create_link("https://example.com".to_string(), Some(code.to_string()))
                .await;
            assert!(
                matches!(result, Err(AppError::InvalidCode { .. })),
                "expected InvalidCode for {code:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_link_with_custom_code() {
        let mut mock = mock_repo();

        mock.expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_insert()
            .withf(|new_link| new_link.code == "abc123")
            .times(1)
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = LinkService::new(Arc::new(mock));

        let link = service
            .create_link(
                "https://example.com".to_string(),
                Some("abc123".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(link.code, "abc123");
    }

    #[tokio::test]
    async fn test_create_link_custom_code_conflict_on_probe() {
        let mut mock = mock_repo();

        let existing = create_test_link("taken1", "https://other.com");
        mock.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link(
                "https://example.com".to_string(),
                Some("taken1".to_string()),
            )
            .await;

        assert!(matches!(result, Err(AppError::CodeConflict { .. })));
    }

    #[tokio::test]
    async fn test_create_link_custom_code_conflict_on_insert_race() {
        let mut mock = mock_repo();

        mock.expect_find_by_code().times(1).returning(|_| Ok(None));
        mock.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Code already exists", json!({}))));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link(
                "https://example.com".to_string(),
                Some("racer1".to_string()),
            )
            .await;

        match result {
            Err(AppError::CodeConflict { details, .. }) => assert_eq!(details["code"], "racer1"),
            other => panic!("expected CodeConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_link_retries_probe_collisions() {
        let mut mock = mock_repo();

        let taken = create_test_link("Taken123", "https://other.com");
        let mut probes = 0;
        mock.expect_find_by_code().times(4).returning(move |_| {
            probes += 1;
            if probes <= 3 {
                Ok(Some(taken.clone()))
            } else {
                Ok(None)
            }
        });
        mock.expect_insert()
            .times(1)
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link("https://example.com".to_string(), None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_retries_insert_race_for_generated_code() {
        let mut mock = mock_repo();
        let mut seq = Sequence::new();

        mock.expect_find_by_code().times(2).returning(|_| Ok(None));
        mock.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Code already exists", json!({}))));
        mock.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(Link::from(new_link)));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link("https://example.com".to_string(), None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_link_allocation_exhausted() {
        let mut mock = mock_repo();

        let taken = create_test_link("Taken123", "https://other.com");
        mock.expect_find_by_code()
            .times(MAX_ALLOCATION_ATTEMPTS)
            .returning(move |_| Ok(Some(taken.clone())));
        mock.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link("https://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::AllocationExhausted { .. })));
    }

    #[tokio::test]
    async fn test_probe_and_insert_collisions_share_one_budget() {
        let mut mock = mock_repo();

        let taken = create_test_link("Taken123", "https://other.com");
        let mut probes = 0;
        mock.expect_find_by_code()
            .times(MAX_ALLOCATION_ATTEMPTS)
            .returning(move |_| {
                probes += 1;
                if probes <= 5 {
                    Ok(Some(taken.clone()))
                } else {
                    Ok(None)
                }
            });
        mock.expect_insert()
            .times(MAX_ALLOCATION_ATTEMPTS - 5)
            .returning(|_| Err(AppError::conflict("Code already exists", json!({}))));

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link("https://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::AllocationExhausted { .. })));
    }

    #[tokio::test]
    async fn test_create_link_store_error_is_not_retried() {
        let mut mock = mock_repo();

        mock.expect_find_by_code()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));
        mock.expect_insert().times(0);

        let service = LinkService::new(Arc::new(mock));

        let result = service
            .create_link("https://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_resolve_records_click() {
        let mut mock = mock_repo();

        mock.expect_record_click()
            .withf(|code, _| code == "abc123")
            .times(1)
            .returning(|code, clicked_at| {
                Ok(Some(Link::new(
                    code.to_string(),
                    "https://example.com".to_string(),
                    1,
                    Some(clicked_at),
                    Utc::now(),
                )))
            });

        let service = LinkService::new(Arc::new(mock));
        let started = Utc::now();

        let (url, link) = service.resolve("abc123").await.unwrap();

        assert_eq!(url, "https://example.com");
        assert_eq!(link.clicks, 1);
        assert!(link.last_clicked_at.unwrap() >= started);
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let mut mock = mock_repo();

        mock.expect_record_click().times(1).returning(|_, _| Ok(None));

        let service = LinkService::new(Arc::new(mock));

        let result = service.resolve("nope123").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_fails_before_click_when_store_not_ready() {
        let mut mock = MockLinkRepository::new();

        mock.expect_initialize()
            .times(1)
            .returning(|| Err(AppError::store_unavailable("down", json!({}))));
        mock.expect_record_click().times(0);

        let service = LinkService::new(Arc::new(mock));

        let result = service.resolve("abc123").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_get_link_has_no_side_effects() {
        let mut mock = mock_repo();

        let link = create_test_link("abc123", "https://example.com");
        mock.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        mock.expect_record_click().times(0);

        let service = LinkService::new(Arc::new(mock));

        let link = service.get_link("abc123").await.unwrap();

        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_delete_link_missing_is_not_found() {
        let mut mock = mock_repo();
        let mut seq = Sequence::new();

        mock.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = LinkService::new(Arc::new(mock));

        assert!(service.delete_link("abc123").await.is_ok());
        assert!(matches!(
            service.delete_link("abc123").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let mut mock = mock_repo();
        mock.expect_list_all().times(2).returning(|| Ok(vec![]));

        let service = LinkService::new(Arc::new(mock));

        service.initialize().await.unwrap();
        service.list_links().await.unwrap();
        service.list_links().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initialize_converges() {
        let service = Arc::new(LinkService::new(Arc::new(mock_repo())));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.initialize().await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn test_failed_initialize_is_retried() {
        let mut mock = MockLinkRepository::new();
        let mut seq = Sequence::new();

        mock.expect_initialize()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(AppError::store_unavailable("down", json!({}))));
        mock.expect_initialize()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let service = LinkService::new(Arc::new(mock));

        assert!(matches!(
            service.initialize().await,
            Err(AppError::StoreUnavailable { .. })
        ));
        assert!(service.initialize().await.is_ok());
        assert!(service.initialize().await.is_ok());
    }

    /// Repository whose lookups never answer in time.
    struct StalledRepository;

    #[async_trait]
    impl LinkRepository for StalledRepository {
        async fn initialize(&self) -> Result<(), AppError> {
            Ok(())
        }

        async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
            Ok(Link::from(new_link))
        }

        async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn record_click(
            &self,
            _code: &str,
            _clicked_at: DateTime<Utc>,
        ) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn delete(&self, _code: &str) -> Result<bool, AppError> {
            Ok(false)
        }

        async fn list_all(&self) -> Result<Vec<Link>, AppError> {
            Ok(vec![])
        }

        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_deadline_surfaces_unavailable() {
        let service = LinkService::new(Arc::new(StalledRepository))
            .with_store_timeout(Duration::from_millis(20));

        assert!(matches!(
            service.get_link("abc123").await,
            Err(AppError::StoreUnavailable { .. })
        ));
        assert!(matches!(
            service.resolve("abc123").await,
            Err(AppError::StoreUnavailable { .. })
        ));
    }
}
