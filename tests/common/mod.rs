#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Utc};
use link_registry::application::services::LinkService;
use link_registry::domain::entities::{Link, NewLink};
use link_registry::domain::repositories::LinkRepository;
use link_registry::infrastructure::persistence::MemoryLinkRepository;
use link_registry::routes::router;
use link_registry::state::AppState;
use std::sync::Arc;

pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let link_service = Arc::new(LinkService::new(repo.clone() as Arc<dyn LinkRepository>));

    (AppState::new(link_service), repo)
}

pub fn create_test_app() -> (Router, Arc<MemoryLinkRepository>) {
    let (state, repo) = create_test_state();
    (router(state), repo)
}

pub async fn create_test_link(repo: &MemoryLinkRepository, code: &str, url: &str) -> Link {
    repo.insert(NewLink::new(code.to_string(), url.to_string()))
        .await
        .unwrap()
}

pub async fn create_test_link_at(
    repo: &MemoryLinkRepository,
    code: &str,
    url: &str,
    created_at: DateTime<Utc>,
) -> Link {
    repo.insert(NewLink {
        code: code.to_string(),
        target_url: url.to_string(),
        created_at,
    })
    .await
    .unwrap()
}
