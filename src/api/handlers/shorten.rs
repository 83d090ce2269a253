//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL for one long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aB3xY9",
///   "shortened_url": "http://localhost:8000/aB3xY9",
///   "original_url": "https://example.com/some/long/path"
/// }
/// ```
///
/// # Errors
///
/// - 422 Unprocessable Entity if the URL is invalid
/// - 503 Service Unavailable if no free short code could be allocated
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let link = state.link_service.shorten(&payload.url).await?;
    let shortened_url = state.link_service.short_url(&link.short_code);

    Ok(Json(ShortenResponse {
        short_code: link.short_code,
        shortened_url,
        original_url: link.original_url,
    }))
}
