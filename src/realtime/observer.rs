//! Observer handles: the registry's view of one attached client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

use crate::realtime::messages::AnalyticsUpdate;

/// What travels down an observer's channel. Shared, never mutated.
pub type Update = Arc<AnalyticsUpdate>;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Send capability for one observer's outbound channel.
///
/// The connection that created the handle owns the receiving end and
/// decides when the client goes away. The registry only ever holds clones of
/// this handle, which lets it push updates but not close the connection.
///
/// Equality and hashing use the [`ObserverId`] alone.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    id: ObserverId,
    tx: mpsc::Sender<Update>,
}

/// Why a single delivery did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("observer channel is closed")]
    Closed,

    #[error("observer did not accept the update within {0:?}")]
    TimedOut(Duration),
}

impl ObserverHandle {
    /// Creates a handle and the receiver its connection reads from.
    ///
    /// `buffer` bounds how many updates may queue for a slow client before
    /// deliveries start waiting (and eventually time out).
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Update>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let id = ObserverId(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queues one update, waiting at most `timeout` for buffer space.
    pub(crate) async fn deliver(&self, update: Update, timeout: Duration) -> Result<(), DeliveryError> {
        self.tx
            .send_timeout(update, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Closed(_) => DeliveryError::Closed,
                SendTimeoutError::Timeout(_) => DeliveryError::TimedOut(timeout),
            })
    }
}

impl PartialEq for ObserverHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObserverHandle {}

impl std::hash::Hash for ObserverHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
