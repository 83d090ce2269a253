//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::realtime::{Registry, SessionSettings};

/// Application state, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub registry: Arc<Registry>,
    pub session: SessionSettings,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        registry: Arc<Registry>,
        session: SessionSettings,
    ) -> Self {
        Self {
            link_service,
            registry,
            session,
        }
    }
}
