//! Handler for the real-time analytics WebSocket.

use axum::{
    extract::{ConnectInfo, Path, State, WebSocketUpgrade},
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::realtime::run_session;
use crate::state::AppState;

/// Upgrades the connection and streams redirect counts for one code.
///
/// # Endpoint
///
/// `GET /ws/analytics/{code}`
///
/// Codes that do not exist yet are accepted; the client then receives no
/// initial snapshot, only heartbeats until the first redirect is counted.
pub async fn analytics_ws_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    debug!(short_code = %code, %peer, "Analytics WebSocket upgrade");

    let links = Arc::clone(&state.link_service);
    let registry = Arc::clone(&state.registry);
    let settings = state.session;

    ws.on_upgrade(move |socket| run_session(socket, code, links, registry, settings))
}
