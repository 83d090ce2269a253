//! Connection boundary for one WebSocket analytics observer.
//!
//! A session owns the socket, the receiving end of its observer channel and
//! its heartbeat timer. Its lifetime is the connection's lifetime:
//!
//! 1. subscribe to the registry
//! 2. send the initial snapshot (skipped for codes that do not exist yet)
//! 3. forward registry updates, emit heartbeats, watch for the client leaving
//! 4. unsubscribe, whatever ended the loop
//!
//! The heartbeat interval lives inside the session future, so it is dropped
//! with the connection and never outlives it.

use std::sync::Arc;
use std::time::Duration;

use axum::BoxError;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::application::services::LinkService;
use crate::realtime::messages::Heartbeat;
use crate::realtime::observer::{ObserverHandle, Update};
use crate::realtime::registry::Registry;

/// Tunables for observer connections.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Time between heartbeats.
    pub heartbeat_interval: Duration,
    /// Updates that may queue for one observer before deliveries wait.
    pub buffer: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            buffer: 32,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum SessionError {
    #[error("socket error: {0}")]
    Socket(axum::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why the session loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    ClientClosed,
    Evicted,
}

/// Runs one observer connection to completion.
pub async fn run_session(
    socket: WebSocket,
    short_code: String,
    links: Arc<LinkService>,
    registry: Arc<Registry>,
    settings: SessionSettings,
) {
    let (sink, inbound) = socket.split();
    let (handle, updates) = ObserverHandle::channel(settings.buffer);
    let observer = handle.id();

    let outcome = drive(
        sink,
        inbound,
        &short_code,
        handle,
        updates,
        &links,
        &registry,
        settings,
    )
    .await;

    match outcome {
        Ok(Ended::ClientClosed) => {
            info!(short_code = %short_code, %observer, "Analytics observer disconnected")
        }
        Ok(Ended::Evicted) => {
            info!(short_code = %short_code, %observer, "Analytics observer closed after failed delivery")
        }
        Err(e) => {
            warn!(short_code = %short_code, %observer, error = %e, "Analytics observer dropped")
        }
    }
}

/// Subscribes `handle`, serves the connection, and unsubscribes whatever
/// ended it.
#[allow(clippy::too_many_arguments)]
async fn drive<S, R, E>(
    sink: S,
    inbound: R,
    short_code: &str,
    handle: ObserverHandle,
    updates: mpsc::Receiver<Update>,
    links: &LinkService,
    registry: &Registry,
    settings: SessionSettings,
) -> Result<Ended, SessionError>
where
    S: Sink<Message> + Unpin,
    S::Error: Into<BoxError>,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Into<BoxError>,
{
    registry.subscribe(short_code, handle.clone());
    info!(short_code, observer = %handle.id(), "Analytics observer connected");

    let outcome = serve(
        sink, inbound, short_code, &handle, updates, links, registry, settings,
    )
    .await;

    registry.unsubscribe(short_code, &handle);

    outcome
}

#[allow(clippy::too_many_arguments)]
async fn serve<S, R, E>(
    mut sink: S,
    mut inbound: R,
    short_code: &str,
    handle: &ObserverHandle,
    mut updates: mpsc::Receiver<Update>,
    links: &LinkService,
    registry: &Registry,
    settings: SessionSettings,
) -> Result<Ended, SessionError>
where
    S: Sink<Message> + Unpin,
    S::Error: Into<BoxError>,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Into<BoxError>,
{
    // Concurrent redirects can broadcast out of order. Anything at or below
    // the last count shown is stale.
    let mut last_count = i64::MIN;

    match links.initial_snapshot(short_code).await {
        Ok(Some(snapshot)) => {
            last_count = snapshot.redirect_count;
            send_json(&mut sink, &snapshot).await?;
        }
        Ok(None) => debug!(short_code, "No record yet, skipping initial snapshot"),
        Err(e) => warn!(short_code, error = %e, "Initial snapshot unavailable"),
    }

    let period = settings.heartbeat_interval;
    let mut heartbeat = interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            Some(update) = updates.recv() => {
                if update.redirect_count > last_count {
                    last_count = update.redirect_count;
                    send_json(&mut sink, update.as_ref()).await?;
                }
            }
            _ = heartbeat.tick() => {
                if !registry.is_subscribed(short_code, handle) {
                    return Ok(Ended::Evicted);
                }
                send_json(&mut sink, &Heartbeat::now()).await?;
            }
            frame = inbound.next() => match frame {
                None | Some(Ok(Message::Close(_))) => return Ok(Ended::ClientClosed),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(SessionError::Socket(axum::Error::new(e))),
            },
        }
    }
}

async fn send_json<S, T>(sink: &mut S, message: &T) -> Result<(), SessionError>
where
    S: Sink<Message> + Unpin,
    S::Error: Into<BoxError>,
    T: Serialize,
{
    let text = serde_json::to_string(message)?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|e| SessionError::Socket(axum::Error::new(e)))
}
