//! Per-code observer registry with broadcast fan-out.
//!
//! The registry maps each short code to the set of observers currently
//! attached to it. It is the only place subscription state is mutated.
//!
//! # Locking
//!
//! Membership lives in a sharded [`DashMap`], so operations on different
//! codes rarely touch the same lock and never a global one. A broadcast
//! holds the shard lock only long enough to clone the current handles; the
//! sends themselves run with no lock held, so a slow client cannot stall
//! subscribe/unsubscribe for anyone else on the same code.
//!
//! # Delivery
//!
//! Each handle gets one send attempt, bounded by the configured timeout, and
//! all attempts for a broadcast run concurrently. A handle whose channel is
//! closed or stays full past the timeout is removed afterwards; nothing is
//! reported to the caller. `broadcast` returns only after every attempt has
//! settled, so two broadcasts issued one after the other by the same caller
//! reach each observer in that order.
//!
//! # Invariant
//!
//! A code with no observers has no entry in the map.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use metrics::{counter, gauge};
use tracing::{debug, warn};

use crate::realtime::messages::AnalyticsUpdate;
use crate::realtime::observer::{ObserverHandle, ObserverId};

/// Default per-handle send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Subscription registry for analytics observers.
pub struct Registry {
    observers: DashMap<String, HashMap<ObserverId, ObserverHandle>>,
    observer_total: AtomicUsize,
    send_timeout: Duration,
}

impl Registry {
    /// Creates an empty registry with the given per-handle send timeout.
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            observers: DashMap::new(),
            observer_total: AtomicUsize::new(0),
            send_timeout,
        }
    }

    /// Registers `handle` under `short_code`.
    ///
    /// Subscribing the same handle twice keeps a single registration. The
    /// code does not have to exist in the record store.
    pub fn subscribe(&self, short_code: &str, handle: ObserverHandle) {
        let id = handle.id();

        // The total moves under the same shard guard as the insert, so a
        // concurrent removal of this handle always sees it counted.
        let total = {
            let mut set = self.observers.entry(short_code.to_owned()).or_default();
            match set.insert(id, handle) {
                None => Some(self.observer_total.fetch_add(1, Ordering::Relaxed) + 1),
                Some(_) => None,
            }
        };

        if let Some(total) = total {
            gauge!("realtime_observers").set(total as f64);
            debug!(short_code, observer = %id, "Observer subscribed");
        }
    }

    /// Removes `handle` from `short_code`; a no-op if it is not registered.
    ///
    /// Takes effect for every broadcast that starts after it returns.
    pub fn unsubscribe(&self, short_code: &str, handle: &ObserverHandle) {
        if self.remove(short_code, handle.id()) {
            debug!(short_code, observer = %handle.id(), "Observer unsubscribed");
        }
    }

    /// Pushes `update` to every observer subscribed to `short_code` when the
    /// call starts.
    ///
    /// Observers that subscribe while a broadcast is in flight are not part
    /// of it. Failed deliveries are logged, counted and turned into
    /// removals; they are never returned.
    pub async fn broadcast(&self, short_code: &str, update: AnalyticsUpdate) {
        let targets: Vec<ObserverHandle> = match self.observers.get(short_code) {
            Some(set) => set.values().cloned().collect(),
            None => return,
        };

        if targets.is_empty() {
            return;
        }

        let update = Arc::new(update);
        let outcomes = join_all(
            targets
                .iter()
                .map(|handle| handle.deliver(Arc::clone(&update), self.send_timeout)),
        )
        .await;

        let mut delivered = 0usize;
        for (handle, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Ok(()) => delivered += 1,
                Err(e) => {
                    counter!("observer_deliveries_failed_total").increment(1);
                    warn!(short_code, observer = %handle.id(), error = %e, "Delivery failed, evicting observer");

                    if self.remove(short_code, handle.id()) {
                        counter!("observer_evictions_total").increment(1);
                    }
                }
            }
        }

        debug!(
            short_code,
            redirect_count = update.redirect_count,
            delivered,
            attempted = targets.len(),
            "Broadcast complete"
        );
    }

    /// Whether `handle` is currently registered under `short_code`.
    pub fn is_subscribed(&self, short_code: &str, handle: &ObserverHandle) -> bool {
        self.observers
            .get(short_code)
            .is_some_and(|set| set.contains_key(&handle.id()))
    }

    /// Number of observers registered under `short_code`.
    pub fn observer_count(&self, short_code: &str) -> usize {
        self.observers.get(short_code).map_or(0, |set| set.len())
    }

    /// Whether `short_code` has an entry at all.
    pub fn has_subscribers(&self, short_code: &str) -> bool {
        self.observers.contains_key(short_code)
    }

    /// Number of codes with at least one observer.
    pub fn active_codes(&self) -> usize {
        self.observers.len()
    }

    /// Number of registrations across all codes.
    pub fn total_observers(&self) -> usize {
        self.observer_total.load(Ordering::Relaxed)
    }

    /// Drops one registration and the code's entry if that empties it.
    fn remove(&self, short_code: &str, id: ObserverId) -> bool {
        let total = match self.observers.get_mut(short_code) {
            Some(mut set) => set.remove(&id).map(|_| {
                self.observer_total
                    .fetch_sub(1, Ordering::Relaxed)
                    .saturating_sub(1)
            }),
            None => None,
        };

        // Re-checked under the shard lock: a concurrent subscribe keeps the entry.
        self.observers.remove_if(short_code, |_, set| set.is_empty());

        if let Some(total) = total {
            gauge!("realtime_observers").set(total as f64);
        }

        total.is_some()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}
