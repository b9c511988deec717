//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, CachedPlaceDetails};
use crate::llm::LlmClient;
use crate::resolve::PlaceResolver;
use crate::store::{Clock, RateLimiter, ResultCache};

/// Shared application state.
///
/// Contains all the services needed to handle requests. The geocode cache
/// and rate limiter are created once here and shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Provider fallback chain
    pub resolver: Arc<PlaceResolver>,

    /// Cached Place Details lookups
    pub details: Arc<CachedPlaceDetails>,

    /// Geocode outcomes by query and destination
    pub geocode_cache: Arc<ResultCache>,

    /// Per-client request spacing for geocoding
    pub rate_limiter: Arc<RateLimiter>,

    /// LLM extraction, when configured
    pub llm: Option<Arc<LlmClient>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(resolver: PlaceResolver, llm: Option<LlmClient>, clock: Arc<dyn Clock>) -> Self {
        let details = CachedPlaceDetails::new(resolver.google().clone(), &CacheConfig::default());
        Self {
            resolver: Arc::new(resolver),
            details: Arc::new(details),
            geocode_cache: Arc::new(ResultCache::in_memory(clock.clone())),
            rate_limiter: Arc::new(RateLimiter::in_memory(clock)),
            llm: llm.map(Arc::new),
        }
    }
}
