#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use live_shortener::application::services::LinkService;
use live_shortener::domain::allocator::DEFAULT_MAX_ATTEMPTS;
use live_shortener::domain::entities::{Link, NewLink};
use live_shortener::domain::repositories::LinkRepository;
use live_shortener::error::AppError;
use live_shortener::realtime::{Registry, SessionSettings};
use live_shortener::state::AppState;

pub const BASE_URL: &str = "http://localhost:8000";

/// Record store kept in a `HashMap`, with a switch to simulate an outage.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, Link>>,
    down: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn insert(&self, code: &str, url: &str, redirect_count: i64) {
        let link = Link::new(code.to_string(), url.to_string(), Utc::now(), redirect_count);
        self.links.lock().unwrap().insert(code.to_string(), link);
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links.lock().unwrap().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.down.load(Ordering::SeqCst) {
            Err(AppError::internal("Database error", json!({})))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();

        if links.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "short_code": new_link.short_code }),
            ));
        }

        let link = Link::new(new_link.short_code, new_link.original_url, Utc::now(), 0);
        links.insert(link.short_code.clone(), link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        self.check()?;
        Ok(self.get(short_code))
    }

    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.links.lock().unwrap().contains_key(short_code))
    }

    async fn increment_redirects(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();

        Ok(links.get_mut(short_code).map(|link| {
            link.redirect_count += 1;
            link.clone()
        }))
    }

    async fn health_check(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

pub struct TestContext {
    pub state: AppState,
    pub repository: Arc<InMemoryLinkRepository>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with(SessionSettings::default())
}

pub fn create_test_state_with(session: SessionSettings) -> TestContext {
    let repository = Arc::new(InMemoryLinkRepository::default());
    let registry = Arc::new(Registry::new(Duration::from_millis(200)));

    let link_service = Arc::new(LinkService::new(
        repository.clone(),
        Arc::clone(&registry),
        BASE_URL,
        DEFAULT_MAX_ATTEMPTS,
    ));

    TestContext {
        state: AppState::new(link_service, registry, session),
        repository,
    }
}
