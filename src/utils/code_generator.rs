//! Short code generation.
//!
//! Codes are 6 characters drawn uniformly from `[A-Za-z0-9]`, giving
//! 62^6 (about 5.7e10) possible codes. Collisions stay rare until the store
//! holds hundreds of thousands of links, so exhausting the allocator's
//! attempt budget is an exceptional path.

use rand::{Rng, distr::Alphanumeric};

/// Length of a generated short code.
pub const CODE_LENGTH: usize = 6;

/// Generates a random mixed-case alphanumeric short code.
///
/// Every call draws fresh randomness from the thread-local RNG; nothing is
/// remembered between calls.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}
