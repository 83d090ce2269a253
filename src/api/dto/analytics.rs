//! DTOs for the analytics endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Current redirect statistics for one short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub original_url: String,
    pub redirect_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for AnalyticsResponse {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            redirect_count: link.redirect_count,
            created_at: link.created_at,
        }
    }
}
