//! HTTP middleware for request processing.
//!
//! Provides cross-origin access and request tracing.

pub mod cors;
pub mod tracing;
