//! Domain layer containing business entities and logic.
//!
//! Nothing here depends on the database, HTTP or WebSocket layers.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Record store trait definitions
//! - [`allocator`] - Collision-avoiding short code allocation
//!
//! Repository traits are implemented by [`crate::infrastructure`]; the
//! workflows that combine them live in [`crate::application::services`].

pub mod allocator;
pub mod entities;
pub mod repositories;
