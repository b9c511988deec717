//! Place resolution across providers.
//!
//! Stages run in order and the first one that yields coordinates wins:
//!
//! 1. Google Places Text Search, refined with Place Details (needs a key)
//! 2. Google Geocoding (needs a key)
//! 3. Nominatim (always tried last)
//!
//! A provider error in stages 1 and 2 is logged and the chain moves on. Stage 3
//! has nothing behind it, so a transport or decode failure there is returned
//! to the caller.

use tracing::{debug, warn};

use crate::place::{Confidence, ResolvedPlace};
use crate::providers::{
    Assessment, GoogleClient, NominatimClient, PlaceResult, ProviderError, RESOLVE_DETAIL_FIELDS,
    ResolutionCandidate,
};

use super::matcher::{MatchMode, find_match, select_candidate};

/// Error that ends a resolution without any fallback left.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The final provider could not be reached or sent an unreadable body
    #[error("last-resort provider failed: {0}")]
    Exhausted(#[source] ProviderError),
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    /// Place name to resolve.
    pub name: String,
    /// Per-place destination that overrides the shared context.
    pub hint: Option<String>,
}

impl PlaceQuery {
    /// A query with no hint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
        }
    }

    /// Attach a destination hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Resolves place names to canonical geocoded places.
#[derive(Debug, Clone)]
pub struct PlaceResolver {
    google: GoogleClient,
    nominatim: NominatimClient,
}

/// `"{query}, {destination}"`, or the bare query.
pub fn search_text(query: &str, destination: Option<&str>) -> String {
    match destination {
        Some(dest) => format!("{query}, {dest}"),
        None => query.to_string(),
    }
}

/// Confidence for the keyed stages, which depends only on whether a
/// destination constrained the search.
fn keyed_assessment(destination: Option<&str>) -> Assessment {
    match destination {
        Some(_) => Assessment {
            confidence: Confidence::High,
            best_guess: false,
        },
        None => Assessment {
            confidence: Confidence::Medium,
            best_guess: true,
        },
    }
}

const NOMINATIM_ASSESSMENT: Assessment = Assessment {
    confidence: Confidence::Low,
    best_guess: true,
};

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Fill gaps in a details response from the search hit it came from.
fn merge_details(search: PlaceResult, details: PlaceResult) -> PlaceResult {
    PlaceResult {
        place_id: details.place_id.or(search.place_id),
        name: details.name.or(search.name),
        formatted_address: details.formatted_address.or(search.formatted_address),
        geometry: details.geometry.or(search.geometry),
        address_components: details.address_components.or(search.address_components),
        ..details
    }
}

impl PlaceResolver {
    /// Create a resolver over the given provider clients.
    pub fn new(google: GoogleClient, nominatim: NominatimClient) -> Self {
        Self { google, nominatim }
    }

    /// Access the Google client (used by the place details view).
    pub fn google(&self) -> &GoogleClient {
        &self.google
    }

    /// Resolve one place name, optionally constrained to a destination.
    ///
    /// Never fails for recoverable conditions: a name no provider can place
    /// comes back as [`ResolvedPlace::unresolved`].
    pub async fn resolve(
        &self,
        query: &str,
        destination: Option<&str>,
    ) -> Result<ResolvedPlace, ResolveError> {
        let query = query.trim();
        let destination = non_blank(destination);
        let search = search_text(query, destination);

        if self.google.has_places_key() {
            match self.via_places(&search, query, destination).await {
                Ok(Some(place)) => return Ok(place),
                Ok(None) => debug!(%query, "places stage found nothing"),
                Err(e) => warn!(%query, error = %e, "places stage failed"),
            }
        }

        if self.google.has_geocoding_key() {
            match self.via_geocoding(&search, query, destination).await {
                Ok(Some(place)) => return Ok(place),
                Ok(None) => debug!(%query, "geocoding stage found nothing"),
                Err(e) => warn!(%query, error = %e, "geocoding stage failed"),
            }
        }

        match self.via_nominatim(&search, query, destination).await {
            Ok(Some(place)) => Ok(place),
            Ok(None) => {
                debug!(%query, "no provider resolved place");
                Ok(ResolvedPlace::unresolved(query))
            }
            Err(e @ (ProviderError::Http(_) | ProviderError::Json { .. })) => {
                Err(ResolveError::Exhausted(e))
            }
            Err(e) => {
                warn!(%query, error = %e, "nominatim stage failed");
                Ok(ResolvedPlace::unresolved(query))
            }
        }
    }

    /// Resolve several names one after another, in input order.
    ///
    /// Blank names come back unresolved without touching any provider. A
    /// per-place hint replaces `destination` for that place.
    pub async fn resolve_batch(
        &self,
        queries: &[PlaceQuery],
        destination: Option<&str>,
    ) -> Vec<ResolvedPlace> {
        let mut out = Vec::with_capacity(queries.len());
        for q in queries {
            if q.name.trim().is_empty() {
                out.push(ResolvedPlace::unresolved(q.name.clone()));
                continue;
            }
            let dest = non_blank(q.hint.as_deref()).or(non_blank(destination));
            let place = match self.resolve(&q.name, dest).await {
                Ok(place) => place,
                Err(e) => {
                    warn!(name = %q.name, error = %e, "resolution failed");
                    ResolvedPlace::unresolved(q.name.trim())
                }
            };
            out.push(place);
        }
        out
    }

    async fn via_places(
        &self,
        search: &str,
        query: &str,
        destination: Option<&str>,
    ) -> Result<Option<ResolvedPlace>, ProviderError> {
        let results = self.google.text_search(search).await?;
        let mut candidates: Vec<ResolutionCandidate> =
            results.into_iter().map(ResolutionCandidate::Places).collect();

        let Some(idx) = select_candidate(&candidates, destination) else {
            return Ok(None);
        };
        let ResolutionCandidate::Places(hit) = candidates.swap_remove(idx) else {
            return Ok(None);
        };

        let place_id = hit.place_id.clone();
        let place = match place_id.as_deref() {
            Some(place_id) => {
                match self
                    .google
                    .place_details(place_id, RESOLVE_DETAIL_FIELDS, None)
                    .await
                {
                    Ok(details) => merge_details(hit, details),
                    Err(e) => {
                        warn!(%place_id, error = %e, "place details failed, using search result");
                        hit
                    }
                }
            }
            None => hit,
        };

        let resolved = ResolutionCandidate::Places(place)
            .into_resolved(query, keyed_assessment(destination));
        Ok(resolved.resolved.then_some(resolved))
    }

    async fn via_geocoding(
        &self,
        search: &str,
        query: &str,
        destination: Option<&str>,
    ) -> Result<Option<ResolvedPlace>, ProviderError> {
        let results = self.google.geocode(search).await?;
        let mut candidates: Vec<ResolutionCandidate> = results
            .into_iter()
            .map(ResolutionCandidate::Geocoding)
            .collect();

        let Some(idx) = select_candidate(&candidates, destination) else {
            return Ok(None);
        };
        let resolved = candidates
            .swap_remove(idx)
            .into_resolved(query, keyed_assessment(destination));
        Ok(resolved.resolved.then_some(resolved))
    }

    async fn via_nominatim(
        &self,
        search: &str,
        query: &str,
        destination: Option<&str>,
    ) -> Result<Option<ResolvedPlace>, ProviderError> {
        let results = self.nominatim.search(search).await?;
        let mut candidates: Vec<ResolutionCandidate> = results
            .into_iter()
            .map(ResolutionCandidate::Nominatim)
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        // Unlike the keyed stages, Nominatim falls back to its top result even
        // when nothing matches the destination.
        let idx = destination
            .and_then(|dest| {
                find_match(&candidates, dest, MatchMode::All)
                    .or_else(|| find_match(&candidates, dest, MatchMode::Any))
            })
            .unwrap_or(0);

        let resolved = candidates
            .swap_remove(idx)
            .into_resolved(query, NOMINATIM_ASSESSMENT);
        Ok(resolved.resolved.then_some(resolved))
    }
}
