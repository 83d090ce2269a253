//! Collision-avoiding short code allocation.
//!
//! [`allocate`] draws candidates from a generator and checks the record
//! store until it finds one that is not taken. It keeps no state between
//! calls and remembers nothing about earlier collisions.
//!
//! The existence check and the caller's insert are not atomic. Two
//! concurrent allocations can both see the same candidate as free; the
//! store's primary key rejects the second insert, and the caller must treat
//! that conflict as a reason to allocate again (see
//! [`crate::application::services::LinkService::shorten`]).

use std::future::Future;
use tracing::{debug, warn};

/// Attempt budget used when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Why an allocation produced no code.
#[derive(Debug, thiserror::Error)]
pub enum AllocateError<E> {
    /// Every candidate within the attempt budget was already taken.
    #[error("no free short code after {attempts} attempts")]
    Exhausted { attempts: usize },

    /// The existence check itself failed.
    #[error("short code existence check failed")]
    Lookup(#[source] E),
}

/// Returns the first generated candidate that `exists` reports as absent.
///
/// `generate` is called once per attempt, so each candidate is an
/// independent draw. After `max_attempts` consecutive collisions the call
/// fails with [`AllocateError::Exhausted`]; it never retries beyond that.
///
/// # Errors
///
/// - [`AllocateError::Exhausted`] when the budget is spent
/// - [`AllocateError::Lookup`] as soon as `exists` returns an error
///
/// # Examples
///
/// ```ignore
/// let code = allocate(
///     generate_code,
///     |code| async move { repository.exists(&code).await },
///     DEFAULT_MAX_ATTEMPTS,
/// )
/// .await?;
/// ```
pub async fn allocate<G, F, Fut, E>(
    mut generate: G,
    mut exists: F,
    max_attempts: usize,
) -> Result<String, AllocateError<E>>
where
    G: FnMut() -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    for attempt in 1..=max_attempts {
        let candidate = generate();

        let taken = exists(candidate.clone())
            .await
            .map_err(AllocateError::Lookup)?;

        if !taken {
            debug!(attempt, short_code = %candidate, "Allocated short code");
            return Ok(candidate);
        }

        debug!(attempt, short_code = %candidate, "Short code collision");
    }

    warn!(max_attempts, "Short code allocation exhausted");

    Err(AllocateError::Exhausted {
        attempts: max_attempts,
    })
}
