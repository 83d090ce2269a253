//! HTTP and WebSocket client for a running server.
//!
//! Used by the `watch` binary. A single base URL is accepted in either form
//! (`ws://`/`wss://` or `http://`/`https://`) and converted for each call.

use reqwest::Client;

use crate::api::dto::analytics::AnalyticsResponse;
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Client for the shortener's REST and WebSocket endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    http_base: String,
    ws_base: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');

        Self {
            http: Client::new(),
            http_base: to_http(base),
            ws_base: to_ws(base),
        }
    }

    /// Base URL used for REST calls.
    pub fn http_base(&self) -> &str {
        &self.http_base
    }

    /// WebSocket URL observing `short_code`.
    pub fn analytics_ws_url(&self, short_code: &str) -> String {
        format!("{}/ws/analytics/{}", self.ws_base, short_code)
    }

    /// `POST /shorten`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for any non-2xx response.
    pub async fn shorten(&self, url: &str) -> Result<ShortenResponse, ClientError> {
        let request = ShortenRequest {
            url: url.to_string(),
        };

        let resp = self
            .http
            .post(format!("{}/shorten", self.http_base))
            .json(&request)
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    /// `GET /analytics/{code}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for any non-2xx response, including
    /// 404 for unknown codes.
    pub async fn analytics(&self, short_code: &str) -> Result<AnalyticsResponse, ClientError> {
        let resp = self
            .http
            .get(format!("{}/analytics/{}", self.http_base, short_code))
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

fn to_http(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{rest}")
    } else if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{rest}")
    } else {
        base.to_string()
    }
}

fn to_ws(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        base.to_string()
    }
}
