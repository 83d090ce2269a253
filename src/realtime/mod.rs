//! Real-time redirect analytics.
//!
//! - [`registry`] - Per-code observer registry and broadcast fan-out
//! - [`observer`] - Observer handles held by the registry
//! - [`messages`] - JSON messages sent to observers
//! - [`session`] - WebSocket connection boundary (subscribe, snapshot, heartbeat)
//!
//! # Flow
//!
//! 1. A client opens `/ws/analytics/{code}`; [`session::run_session`] subscribes it
//! 2. A redirect increments the counter in the record store
//! 3. [`crate::application::services::LinkService::record_redirect`] hands the
//!    committed value to [`registry::Registry::broadcast`]
//! 4. Every observer of that code receives the update

pub mod messages;
pub mod observer;
pub mod registry;
pub mod session;

pub use messages::{AnalyticsUpdate, Heartbeat, InitialSnapshot, ObserverMessage};
pub use observer::{DeliveryError, ObserverHandle, ObserverId};
pub use registry::Registry;
pub use session::{SessionSettings, run_session};
