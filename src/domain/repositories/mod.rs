//! Repository trait definitions for the domain layer.
//!
//! The record store is consumed through [`LinkRepository`]; the PostgreSQL
//! implementation lives in `crate::infrastructure::persistence`, and a
//! `mockall` mock is generated for unit tests.

pub mod link_repository;

pub use link_repository::LinkRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
