//! Helper functions used across the application.
//!
//! - [`code_generator`] - Random short code candidates
//! - [`destination`] - Destination URL parsing and normalization

pub mod code_generator;
pub mod destination;
