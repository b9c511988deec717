//! Caching layer for Place Details responses.
//!
//! Details are keyed by provider place id, which is stable, so a long TTL
//! is safe. Resolver lookups are not cached here; see [`crate::store`] for
//! the geocode outcome cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::providers::{FULL_DETAIL_FIELDS, GoogleClient, PlaceResult, ProviderError};

/// Upper bound on a single Place Details call from the details view.
pub const DETAILS_TIMEOUT: Duration = Duration::from_millis(4500);

/// Configuration for the details cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Google client with a Place Details cache in front of it.
#[derive(Debug, Clone)]
pub struct CachedPlaceDetails {
    client: GoogleClient,
    details: MokaCache<String, Arc<PlaceResult>>,
}

impl CachedPlaceDetails {
    /// Create a new cached client.
    pub fn new(client: GoogleClient, config: &CacheConfig) -> Self {
        let details = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, details }
    }

    /// The wrapped client.
    pub fn client(&self) -> &GoogleClient {
        &self.client
    }

    /// Full details for `place_id`, using the cache if available.
    pub async fn get_details(&self, place_id: &str) -> Result<Arc<PlaceResult>, ProviderError> {
        if let Some(cached) = self.details.get(place_id).await {
            debug!(%place_id, "details cache hit");
            return Ok(cached);
        }

        let details = self
            .client
            .place_details(place_id, FULL_DETAIL_FIELDS, Some(DETAILS_TIMEOUT))
            .await?;

        let entry = Arc::new(details);
        self.details
            .insert(place_id.to_string(), entry.clone())
            .await;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::GoogleConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/place/details/json"))
            .and(query_param("place_id", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "result": {"place_id": "abc", "name": "Wat Hat Yai Nai", "rating": 4.6}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = GoogleConfig::new(Some("k".into()), None).with_base_url(server.uri());
        let cached = CachedPlaceDetails::new(
            GoogleClient::new(config).unwrap(),
            &CacheConfig::default(),
        );

        let first = cached.get_details("abc").await.unwrap();
        let second = cached.get_details("abc").await.unwrap();
        assert_eq!(first.name.as_deref(), Some("Wat Hat Yai Nai"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/place/details/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "NOT_FOUND"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let config = GoogleConfig::new(Some("k".into()), None).with_base_url(server.uri());
        let cached = CachedPlaceDetails::new(
            GoogleClient::new(config).unwrap(),
            &CacheConfig::default(),
        );

        assert!(cached.get_details("gone").await.is_err());
        assert!(cached.get_details("gone").await.is_err());
    }
}
