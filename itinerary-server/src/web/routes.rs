//! HTTP route handlers.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{
        ConnectInfo, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::itinerary::parse_itinerary;
use crate::providers::{ProviderError, ResolutionCandidate};
use crate::resolve::{ResolveError, search_text, select_candidate};
use crate::store::RateLimited;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract-places-from-text", post(extract_places))
        .route("/resolve-places", post(resolve_places))
        .route("/geocode-place", post(geocode_place))
        .route("/place-details", get(place_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse free text into day groups, then let the LLM (if any) name the places.
///
/// LLM failures fall back to the rule-based places; the response is 200
/// either way.
async fn extract_places(
    State(state): State<AppState>,
    payload: Result<Json<ExtractPlacesRequest>, JsonRejection>,
) -> Result<Json<ExtractPlacesResponse>, AppError> {
    let Json(req) = payload?;
    let text = non_blank(req.text.as_deref()).ok_or_else(|| AppError::BadRequest {
        message: "text is required".to_string(),
    })?;

    let parse = parse_itinerary(text, req.destination.as_deref());
    let fallback_places = || -> Vec<PlaceView> {
        parse
            .places()
            .map(|(day, place)| PlaceView::from_parsed(day, place))
            .collect()
    };

    let extraction = match &state.llm {
        Some(llm) => match llm
            .extract(&parse.cleaned_request, parse.destination.as_deref())
            .await
        {
            Ok(extraction) => Some(extraction),
            Err(e) => {
                warn!(error = %e, "llm extraction failed, using parsed places");
                None
            }
        },
        None => None,
    };

    let response = match extraction {
        Some(extraction) => {
            let places: Vec<PlaceView> =
                extraction.places.iter().map(PlaceView::from_extracted).collect();
            let summary = extraction
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| fallback_summary(places.len(), parse.days.len()));
            let destination = parse.destination.clone().or(extraction.destination);
            ExtractPlacesResponse::new(&parse, places, summary, destination)
        }
        None => {
            let places = fallback_places();
            let summary = fallback_summary(places.len(), parse.days.len());
            ExtractPlacesResponse::new(&parse, places, summary, parse.destination.clone())
        }
    };

    info!(
        places = response.places.len(),
        days = response.days.len(),
        "extracted places"
    );
    Ok(Json(response))
}

/// Resolve a batch of names in input order.
async fn resolve_places(
    State(state): State<AppState>,
    payload: Result<Json<ResolvePlacesRequest>, JsonRejection>,
) -> Result<Json<ResolvePlacesResponse>, AppError> {
    let Json(req) = payload?;
    if req.places.is_none() {
        return Err(AppError::BadRequest {
            message: "places must be an array".to_string(),
        });
    }

    let queries = req.queries();
    let resolved = state
        .resolver
        .resolve_batch(&queries, req.destination())
        .await;

    info!(
        requested = queries.len(),
        resolved = resolved.iter().filter(|p| p.resolved).count(),
        "resolved batch"
    );
    Ok(Json(ResolvePlacesResponse {
        places: resolved.into_iter().map(ResolvedPlaceView::from).collect(),
    }))
}

/// Best-effort client identity: first `X-Forwarded-For` entry, else the
/// socket address.
fn client_id(headers: &HeaderMap, connect: Option<&ConnectInfo<SocketAddr>>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| connect.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Cached, rate-limited single-place geocode.
///
/// The rate limit is checked before the cache, so a repeat inside the window
/// is rejected even when the answer is cached.
async fn geocode_place(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<GeocodePlaceRequest>, JsonRejection>,
) -> Result<Json<GeocodePlaceResponse>, AppError> {
    let Json(req) = payload?;
    let query = non_blank(req.query.as_deref()).ok_or_else(|| AppError::BadRequest {
        message: "query is required".to_string(),
    })?;
    let destination = non_blank(req.destination.as_deref());

    let client = client_id(&headers, connect.as_ref());
    state.rate_limiter.check(&client).await?;

    if let Some(coordinates) = state.geocode_cache.get(query, destination).await {
        return Ok(Json(GeocodePlaceResponse::new(coordinates)));
    }

    let place = state.resolver.resolve(query, destination).await?;
    let coordinates = place.coordinates();
    state
        .geocode_cache
        .put(query, destination, coordinates)
        .await;

    debug!(%query, found = coordinates.is_some(), "geocoded place");
    Ok(Json(GeocodePlaceResponse::new(coordinates)))
}

/// How the details view finds its place.
enum DetailsLookup<'a> {
    PlaceId(&'a str),
    Text(&'a str),
}

/// Canonical details for a place, by provider id or by search text.
///
/// A provider id wins when both are given.
async fn place_details(
    State(state): State<AppState>,
    query: Result<Query<PlaceDetailsQuery>, QueryRejection>,
) -> Result<Json<PlaceDetailsResponse>, AppError> {
    let Query(query) = query?;
    let lookup = match (
        non_blank(query.provider_place_id.as_deref()),
        non_blank(query.query_text.as_deref()),
    ) {
        (Some(id), _) => DetailsLookup::PlaceId(id),
        (None, Some(text)) => DetailsLookup::Text(text),
        (None, None) => {
            return Err(AppError::BadRequest {
                message: "providerPlaceId or queryText is required".to_string(),
            });
        }
    };

    let google = state.details.client();
    if !google.has_places_key() {
        return Err(AppError::BadGateway {
            message: "places provider is not configured".to_string(),
        });
    }

    let place_id = match lookup {
        DetailsLookup::PlaceId(id) => id.to_string(),
        DetailsLookup::Text(text) => {
            let destination = non_blank(query.destination_context.as_deref());
            let results = google
                .text_search(&search_text(text, destination))
                .await
                .map_err(details_error)?;
            let candidates: Vec<ResolutionCandidate> =
                results.into_iter().map(ResolutionCandidate::Places).collect();

            // Unlike the resolver, the details view settles for the top hit.
            let idx = select_candidate(&candidates, destination)
                .or_else(|| (!candidates.is_empty()).then_some(0));
            let found = idx.and_then(|i| match &candidates[i] {
                ResolutionCandidate::Places(hit) => hit.place_id.clone(),
                _ => None,
            });
            found.ok_or_else(|| AppError::NotFound {
                message: format!("no place found for {text:?}"),
            })?
        }
    };

    let details = state
        .details
        .get_details(&place_id)
        .await
        .map_err(details_error)?;

    Ok(Json(PlaceDetailsResponse::from_details(
        &place_id,
        &details,
        query.review_limit(),
    )))
}

/// Provider failures in the details view: "no such place" is a 404,
/// everything else a 502.
fn details_error(e: ProviderError) -> AppError {
    match &e {
        ProviderError::Status { status, .. } if status == "NOT_FOUND" || status == "ZERO_RESULTS" => {
            AppError::NotFound {
                message: e.to_string(),
            }
        }
        _ => AppError::BadGateway {
            message: e.to_string(),
        },
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    TooManyRequests { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<RateLimited> for AppError {
    fn from(e: RateLimited) -> Self {
        AppError::TooManyRequests {
            message: e.to_string(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::TooManyRequests { message } => (StatusCode::TOO_MANY_REQUESTS, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", " 203.0.113.7 , 10.0.0.1".parse().unwrap());
        let connect = ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 5000)));
        assert_eq!(client_id(&headers, Some(&connect)), "203.0.113.7");
    }

    #[test]
    fn client_id_falls_back_to_socket_then_unknown() {
        let headers = HeaderMap::new();
        let connect = ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 5000)));
        assert_eq!(client_id(&headers, Some(&connect)), "192.168.1.2");
        assert_eq!(client_id(&headers, None), "unknown");
    }

    #[test]
    fn details_not_found_status_is_404() {
        let e = ProviderError::Status {
            provider: "place details",
            status: "NOT_FOUND".into(),
            message: None,
        };
        assert!(matches!(details_error(e), AppError::NotFound { .. }));

        let e = ProviderError::Status {
            provider: "place details",
            status: "REQUEST_DENIED".into(),
            message: Some("bad key".into()),
        };
        assert!(matches!(details_error(e), AppError::BadGateway { .. }));
    }
}
