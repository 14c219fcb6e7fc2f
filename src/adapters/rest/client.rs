//! Shared HTTP plumbing for the REST adapters.
//!
//! Every request carries `Content-Type: application/json` and a fresh
//! `X-Request-Id`. `Authorization: Bearer …` is added only when the token
//! provider yields a token; otherwise the request goes out with reduced
//! headers and the backend's 401 comes back as `SyncError::Auth`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::domain::foundation::SyncError;
use crate::ports::TokenProvider;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Thin wrapper over `reqwest::Client` bound to one API endpoint.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Builds a client from configuration.
    pub fn from_config(config: &ApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| SyncError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_http(&config.endpoint, http, tokens)
    }

    /// Builds a client with default timeouts (for tests and tools).
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_http(base_url, http, tokens)
    }

    fn with_http(base_url: &str, http: reqwest::Client, tokens: Arc<dyn TokenProvider>) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::transport(format!("Invalid API endpoint '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::transport(format!(
                "Invalid API endpoint '{}': cannot be a base URL",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Starts a request with the standard headers attached.
    pub async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        match self.tokens.bearer_token().await {
            Ok(Some(token)) => builder = builder.bearer_auth(token.expose_secret()),
            Ok(None) => {
                tracing::warn!("No valid auth token available for API request");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token provider failed; sending request without credentials");
            }
        }
        builder
    }

    /// Sends a request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SyncError> {
        let response = self.dispatch(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::transport(format!("Failed to read response: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "Failed to decode response body");
            SyncError::malformed(format!("Invalid response body: {}", e))
        })
    }

    /// Sends a request whose success body is ignored.
    pub async fn send_empty(&self, builder: RequestBuilder) -> Result<(), SyncError> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, SyncError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(status = status.as_u16(), message = %message, "Backend rejected request");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(SyncError::auth(message))
        } else {
            Err(SyncError::server(status.as_u16(), message))
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::transport(format!("Request timed out: {}", e))
    } else {
        SyncError::transport(format!("Network error: {}", e))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Picks the most useful human-readable message from an error response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error).filter(|m| !m.is_empty()) {
            return message;
        }
    }
    if let Ok(Value::String(text)) = serde_json::from_str::<Value>(body) {
        return text;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    let reason = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string());
    format!("Request failed with status {}", reason)
}
