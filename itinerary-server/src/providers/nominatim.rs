//! OpenStreetMap Nominatim client.
//!
//! Nominatim needs no key but its usage policy requires an identifying
//! `User-Agent`. Requests always ask for English labels and address details.

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;

use super::error::ProviderError;
use super::http::fetch_json;
use super::types::NominatimResult;

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "itinerary-server/0.1 (trip place resolver)";

/// Maximum results requested per search.
const DEFAULT_LIMIT: u8 = 5;

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Results per search
    pub limit: u8,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl NominatimConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    limit: u8,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            limit: config.limit,
        })
    }

    /// Free-text search.
    pub async fn search(&self, query: &str) -> Result<Vec<NominatimResult>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        debug!(%query, "nominatim search");

        fetch_json(self.http.get(&url).query(&[
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", self.limit.to_string()),
            ("addressdetails", "1".to_string()),
        ]))
        .await
    }
}
