//! API route configuration.

use crate::api::handlers::{
    analytics_handler, analytics_ws_handler, health_handler, info_handler, redirect_handler,
    shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All public routes.
///
/// # Endpoints
///
/// - `GET  /`                    - Service info
/// - `GET  /health`              - Health check
/// - `POST /shorten`             - Create a short URL
/// - `GET  /analytics/{code}`    - Current redirect count
/// - `GET  /ws/analytics/{code}` - Live redirect counts over WebSocket
/// - `GET  /{code}`              - Redirect to the original URL
///
/// Static segments take precedence over `/{code}`, so `health` and
/// `shorten` can never be resolved as short codes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
        .route("/shorten", post(shorten_handler))
        .route("/analytics/{code}", get(analytics_handler))
        .route("/ws/analytics/{code}", get(analytics_ws_handler))
        .route("/{code}", get(redirect_handler))
}
