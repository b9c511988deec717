//! Client for the external LLM place-extraction service.
//!
//! The service is opaque JSON-in/JSON-out: it receives the parser's cleaned
//! request and returns a list of place names. Callers fall back to the
//! rule-based parse on any error, so nothing here is fatal to a request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default request timeout for extraction calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the extraction service.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Service answered but found no places
    #[error("extraction returned no places")]
    Empty,
}

/// Configuration for the extraction client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Extraction endpoint URL
    pub url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a config for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequest<'a> {
    cleaned_request: &'a str,
    destination: Option<&'a str>,
}

/// Day reference as the model returns it: a number or a label.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DayRef {
    Number(u32),
    Label(String),
}

/// A place named by the model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExtractedPlace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<DayRef>,
}

/// Successful extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub places: Vec<ExtractedPlace>,
    pub summary: Option<String>,
    pub destination: Option<String>,
}

/// Extraction service client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl LlmClient {
    /// Create a new client.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            url: config.url,
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Ask the service for the places in `cleaned_request`.
    ///
    /// Blank names are dropped; a response with none left is [`LlmError::Empty`].
    pub async fn extract(
        &self,
        cleaned_request: &str,
        destination: Option<&str>,
    ) -> Result<Extraction, LlmError> {
        let mut request = self.http.post(&self.url).json(&ExtractionRequest {
            cleaned_request,
            destination,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        let mut extraction: Extraction =
            serde_json::from_str(&body).map_err(|e| LlmError::Json {
                message: e.to_string(),
            })?;

        extraction.places.retain(|p| !p.name.trim().is_empty());
        if extraction.places.is_empty() {
            return Err(LlmError::Empty);
        }
        debug!(count = extraction.places.len(), "llm extraction");
        Ok(extraction)
    }
}
