//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the real-time registry, and give
//! HTTP handlers and WebSocket sessions a small API to call.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shortening, lookup and redirect counting

pub mod services;
