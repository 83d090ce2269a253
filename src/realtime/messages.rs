//! JSON messages pushed to analytics observers.
//!
//! One JSON object per text frame:
//!
//! ```json
//! {"short_code":"AbC123","redirect_count":3,"created_at":"2024-05-01T10:00:00Z","timestamp":"2024-05-01T10:05:00Z"}
//! {"short_code":"AbC123","redirect_count":4,"timestamp":"2024-05-01T10:06:00Z"}
//! {"type":"heartbeat","timestamp":"2024-05-01T10:06:30Z"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Counter change broadcast after a redirect is committed.
///
/// Built once per mutation and shared read-only between observers, so every
/// observer sees the value that was current when the broadcast started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsUpdate {
    pub short_code: String,
    pub redirect_count: i64,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsUpdate {
    pub fn from_link(link: &Link, timestamp: DateTime<Utc>) -> Self {
        Self {
            short_code: link.short_code.clone(),
            redirect_count: link.redirect_count,
            timestamp,
        }
    }
}

/// Current state sent once to a freshly attached observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    pub short_code: String,
    pub redirect_count: i64,
    pub created_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

impl InitialSnapshot {
    pub fn from_link(link: &Link, timestamp: DateTime<Utc>) -> Self {
        Self {
            short_code: link.short_code.clone(),
            redirect_count: link.redirect_count,
            created_at: link.created_at,
            timestamp,
        }
    }
}

/// Keep-alive generated locally by each connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "heartbeat")]
pub struct Heartbeat {
    pub timestamp: DateTime<Utc>,
}

impl Heartbeat {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }
}

/// Any message an observer can receive, for client-side decoding.
///
/// Variants are tried in order, most specific first: a snapshot needs
/// `created_at`, an update needs `short_code`, and only a heartbeat carries
/// neither.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ObserverMessage {
    Snapshot(InitialSnapshot),
    Update(AnalyticsUpdate),
    Heartbeat(Heartbeat),
}
