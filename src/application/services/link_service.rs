//! Link creation, lookup and redirect counting.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::allocator::{AllocateError, allocate};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::realtime::messages::{AnalyticsUpdate, InitialSnapshot};
use crate::realtime::registry::Registry;
use crate::utils::code_generator::generate_code;
use crate::utils::destination::parse_destination;

/// Inserts attempted per shorten request when codes keep colliding at insert time.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Service for creating, resolving and counting short links.
///
/// Every committed counter change is handed to the [`Registry`] so attached
/// observers see it.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    registry: Arc<Registry>,
    base_url: String,
    max_attempts: usize,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `max_attempts` is the allocator's collision budget per allocation.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        registry: Arc<Registry>,
        base_url: impl Into<String>,
        max_attempts: usize,
    ) -> Self {
        Self {
            repository,
            registry,
            base_url: base_url.into(),
            max_attempts,
        }
    }

    /// Shortens `url` under a freshly allocated code.
    ///
    /// An insert rejected because another request claimed the same code in
    /// the meantime triggers a new allocation, up to [`MAX_INSERT_ATTEMPTS`].
    /// Running out of inserts reports the number of inserts made; running
    /// out inside one allocation reports the allocator's budget.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an http(s) URL
    /// - [`AppError::AllocationExhausted`] if no free code was found
    /// - [`AppError::Internal`] on database errors
    pub async fn shorten(&self, url: &str) -> Result<Link, AppError> {
        let original_url = parse_destination(url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        for insert_attempt in 1..=MAX_INSERT_ATTEMPTS {
            let short_code = self.allocate_code().await?;

            let new_link = NewLink {
                short_code,
                original_url: original_url.clone(),
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    counter!("codes_allocated_total").increment(1);
                    info!(short_code = %link.short_code, original_url = %link.original_url, "Created short URL");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(insert_attempt, "Short code claimed before insert, allocating again");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::AllocationExhausted {
            attempts: MAX_INSERT_ATTEMPTS,
        })
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn get_link(&self, short_code: &str) -> Result<Link, AppError> {
        self.repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| not_found(short_code))
    }

    /// Counts one redirect and broadcasts the new counter.
    ///
    /// The broadcast carries the value returned by the increment itself, so
    /// observers see the state this redirect committed. Delivery problems
    /// never fail the redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code; nothing is
    /// broadcast in that case.
    pub async fn record_redirect(&self, short_code: &str) -> Result<Link, AppError> {
        let link = self
            .repository
            .increment_redirects(short_code)
            .await?
            .ok_or_else(|| not_found(short_code))?;

        counter!("redirects_total").increment(1);

        self.registry
            .broadcast(short_code, AnalyticsUpdate::from_link(&link, Utc::now()))
            .await;

        info!(short_code, original_url = %link.original_url, redirect_count = link.redirect_count, "Redirecting");

        Ok(link)
    }

    /// Current state for a newly attached observer, if the code exists.
    pub async fn initial_snapshot(
        &self,
        short_code: &str,
    ) -> Result<Option<InitialSnapshot>, AppError> {
        let link = self.repository.find_by_code(short_code).await?;
        Ok(link.map(|link| InitialSnapshot::from_link(&link, Utc::now())))
    }

    /// Public URL for a short code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), short_code)
    }

    /// Whether the record store is reachable.
    pub async fn health_check(&self) -> bool {
        self.repository.health_check().await
    }

    async fn allocate_code(&self) -> Result<String, AppError> {
        let repository = &self.repository;

        allocate(
            generate_code,
            |candidate| async move { repository.exists(&candidate).await },
            self.max_attempts,
        )
        .await
        .map_err(|e| match e {
            AllocateError::Exhausted { attempts } => AppError::AllocationExhausted { attempts },
            AllocateError::Lookup(e) => e,
        })
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": short_code }))
}
