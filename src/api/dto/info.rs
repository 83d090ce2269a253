//! DTO for the service info endpoint.

use serde::Serialize;
use std::collections::BTreeMap;

/// Service name, version and a map of the public endpoints.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
