//! HTTP request layer
//!
//! Wraps one shared `reqwest::Client` and the location registry. Every
//! backend call goes through [`ApiClient::get_json`].

use api::{endpoint, ApiError, Location, LocationRegistry, ParamValue};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Location(#[from] ApiError),
}

impl RequestError {
    #[allow(dead_code)]
    pub fn is_status(&self) -> bool {
        matches!(self, RequestError::Status { .. })
    }
}

/// Build a status error, preferring the `message` (or `error`) field of a
/// JSON error body over the status reason phrase
pub fn status_error(status: StatusCode, body: &str) -> RequestError {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
        })
        .filter(|s| !s.is_empty());

    let message = from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });

    RequestError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Backend client bound to a location registry
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    registry: LocationRegistry,
}

impl ApiClient {
    pub fn new(registry: LocationRegistry, timeout: Duration) -> Result<Self, RequestError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, registry })
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Resolve a location id (or the default) to a location
    pub fn location(&self, id: Option<&str>) -> Result<&Location, RequestError> {
        Ok(self.registry.resolve(id)?)
    }

    /// Template `path` with `params`, send it to `location` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, ParamValue)],
        location: Option<&str>,
    ) -> Result<T, RequestError> {
        let location = self.location(location)?;
        let url = location.api_url(&endpoint(path, params));

        debug!("GET {} ({})", url, location.id);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("GET {} -> {}", url, status);
            return Err(status_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
