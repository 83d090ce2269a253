//! Link entity: one short code mapped to one destination URL.

use chrono::{DateTime, Utc};

/// A stored short link together with its redirect counter.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Link {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub redirect_count: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        short_code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        redirect_count: i64,
    ) -> Self {
        Self {
            short_code,
            original_url,
            created_at,
            redirect_count,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
}
