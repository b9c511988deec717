//! Google Places and Geocoding HTTP client.
//!
//! Uses the legacy JSON web services:
//! - `place/textsearch/json` for free-text place search
//! - `place/details/json` for canonical identity, address breakdown, reviews
//! - `geocode/json` for address geocoding
//!
//! Places and Geocoding may use different keys. A missing key makes the
//! corresponding calls fail with [`ProviderError::MissingKey`] without any
//! network traffic.

use std::time::Duration;

use tracing::debug;

use super::error::ProviderError;
use super::http::{check_google_status, fetch_json};
use super::types::{
    GeocodeResponse, GeocodeResult, PlaceDetailsResponse, PlaceResult, TextSearchResponse,
};

/// Default base URL for the Places web service.
const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Default base URL for the Geocoding web service.
const DEFAULT_GEOCODING_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

/// Fields requested when the resolver refines a text search hit.
pub const RESOLVE_DETAIL_FIELDS: &str = "place_id,name,formatted_address,address_components,geometry";

/// Fields requested for the place details view.
pub const FULL_DETAIL_FIELDS: &str = "place_id,name,formatted_address,address_components,geometry,rating,user_ratings_total,website,formatted_phone_number,international_phone_number,url,opening_hours,reviews";

/// Configuration for the Google client.
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// Key for Places Text Search and Place Details
    pub places_api_key: Option<String>,
    /// Key for the Geocoding API
    pub geocoding_api_key: Option<String>,
    /// Base URL for Places endpoints
    pub places_base_url: String,
    /// Base URL for Geocoding endpoints
    pub geocoding_base_url: String,
}

impl GoogleConfig {
    /// Create a config with the given keys and production URLs.
    pub fn new(places_api_key: Option<String>, geocoding_api_key: Option<String>) -> Self {
        Self {
            places_api_key: places_api_key.filter(|k| !k.trim().is_empty()),
            geocoding_api_key: geocoding_api_key.filter(|k| !k.trim().is_empty()),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_string(),
            geocoding_base_url: DEFAULT_GEOCODING_BASE_URL.to_string(),
        }
    }

    /// Point both services at one base URL (for testing).
    ///
    /// Places paths become `{url}/place/...` and geocoding `{url}/geocode/...`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.places_base_url = format!("{url}/place");
        self.geocoding_base_url = format!("{url}/geocode");
        self
    }
}

/// Google Places / Geocoding client.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    /// Create a new client.
    ///
    /// Requests carry no overall timeout; callers that need one pass it per
    /// call.
    pub fn new(config: GoogleConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            config,
        })
    }

    /// Whether a Places key is configured.
    pub fn has_places_key(&self) -> bool {
        self.config.places_api_key.is_some()
    }

    /// Whether a Geocoding key is configured.
    pub fn has_geocoding_key(&self) -> bool {
        self.config.geocoding_api_key.is_some()
    }

    fn places_key(&self) -> Result<&str, ProviderError> {
        self.config
            .places_api_key
            .as_deref()
            .ok_or(ProviderError::MissingKey("places"))
    }

    fn geocoding_key(&self) -> Result<&str, ProviderError> {
        self.config
            .geocoding_api_key
            .as_deref()
            .ok_or(ProviderError::MissingKey("geocoding"))
    }

    /// Places Text Search.
    pub async fn text_search(&self, query: &str) -> Result<Vec<PlaceResult>, ProviderError> {
        let key = self.places_key()?;
        let url = format!("{}/textsearch/json", self.config.places_base_url);
        debug!(%query, "places text search");

        let response: TextSearchResponse = fetch_json(
            self.http
                .get(&url)
                .query(&[("query", query), ("key", key)]),
        )
        .await?;

        check_google_status("places", &response.status, response.error_message)?;
        Ok(response.results)
    }

    /// Place Details for a place id.
    ///
    /// `timeout` bounds this single request, independent of the client-wide
    /// setting.
    pub async fn place_details(
        &self,
        place_id: &str,
        fields: &str,
        timeout: Option<Duration>,
    ) -> Result<PlaceResult, ProviderError> {
        let key = self.places_key()?;
        let url = format!("{}/details/json", self.config.places_base_url);
        debug!(%place_id, "place details");

        let mut request = self.http.get(&url).query(&[
            ("place_id", place_id),
            ("fields", fields),
            ("key", key),
        ]);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response: PlaceDetailsResponse = fetch_json(request).await?;
        check_google_status("place details", &response.status, response.error_message)?;
        response.result.ok_or_else(|| ProviderError::Json {
            message: "place details response has no result".to_string(),
        })
    }

    /// Geocoding API lookup.
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, ProviderError> {
        let key = self.geocoding_key()?;
        let url = format!("{}/json", self.config.geocoding_base_url);
        debug!(%address, "geocoding lookup");

        let response: GeocodeResponse = fetch_json(
            self.http
                .get(&url)
                .query(&[("address", address), ("key", key)]),
        )
        .await?;

        check_google_status("geocoding", &response.status, response.error_message)?;
        Ok(response.results)
    }
}
