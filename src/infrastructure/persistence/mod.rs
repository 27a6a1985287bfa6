//! Link store implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL, the production store
//! - [`MemoryLinkRepository`] - Process-local map for tests and DB-less runs

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use crate::config::{Config, StorageBackend};
use crate::domain::repositories::LinkRepository;

/// Builds the repository selected by `STORAGE_BACKEND`.
///
/// The PostgreSQL pool connects lazily: the first round-trip happens when the
/// registry is initialized, so connection failures surface as
/// `StoreUnavailable` from the registry rather than here.
///
/// # Errors
///
/// Returns an error if the database URL cannot be parsed.
pub fn build_repository(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory link store");
            Ok(Arc::new(MemoryLinkRepository::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect_lazy(database_url)
                .context("Invalid database URL")?;

            tracing::info!("Using PostgreSQL link store");
            Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))))
        }
    }
}
