//! Handler for the service info endpoint.

use axum::Json;
use std::collections::BTreeMap;

use crate::api::dto::info::InfoResponse;

/// Describes the service and lists its endpoints.
///
/// # Endpoint
///
/// `GET /`
pub async fn info_handler() -> Json<InfoResponse> {
    let endpoints = BTreeMap::from([
        ("shorten", "POST /shorten"),
        ("redirect", "GET /{short_code}"),
        ("analytics", "GET /analytics/{short_code}"),
        ("websocket", "GET /ws/analytics/{short_code}"),
        ("health", "GET /health"),
    ]);

    Json(InfoResponse {
        message: "URL Shortener with real-time analytics".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}
