//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Short link storage and redirect counting

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
