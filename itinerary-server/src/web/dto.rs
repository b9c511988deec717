//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::itinerary::{ParseResult, ParsedDayGroup, ParsedPlace};
use crate::llm::{DayRef, ExtractedPlace};
use crate::place::{AddressParts, Confidence, Coordinates, ResolvedPlace};
use crate::providers::{OpeningHours, PlaceResult, PlaceReview};
use crate::resolve::PlaceQuery;

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// POST /extract-places-from-text
// ---------------------------------------------------------------------------

/// Request to pull places out of free text.
#[derive(Debug, Deserialize)]
pub struct ExtractPlacesRequest {
    /// Raw itinerary text
    pub text: Option<String>,

    /// Optional destination, e.g. "Hat Yai, Thailand"
    pub destination: Option<String>,
}

/// Who named a place in the extraction response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceOrigin {
    /// Rule-based parse of the traveler's own text
    User,
    /// External LLM extraction
    Llm,
}

/// A place in the extraction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub source: PlaceOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_text: Option<String>,
}

impl PlaceView {
    /// A parsed place in its day.
    pub fn from_parsed(day: &ParsedDayGroup, place: &ParsedPlace) -> Self {
        Self {
            name: place.name.clone(),
            day: Some(day.label.clone()),
            source: PlaceOrigin::User,
            time_text: place.time_text.clone(),
        }
    }

    /// A place named by the LLM.
    pub fn from_extracted(place: &ExtractedPlace) -> Self {
        let day = place.day.as_ref().map(|d| match d {
            DayRef::Number(n) => format!("Day {n}"),
            DayRef::Label(label) => label.trim().to_string(),
        });
        Self {
            name: place.name.trim().to_string(),
            day: day.filter(|d| !d.is_empty()),
            source: PlaceOrigin::Llm,
            time_text: None,
        }
    }
}

/// Extraction response.
///
/// `cleanedRequest` and `previewText` are also sent under snake_case keys
/// for older clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractPlacesResponse {
    pub success: bool,
    pub places: Vec<PlaceView>,
    pub summary: String,
    pub destination: Option<String>,
    pub cleaned_request: String,
    #[serde(rename = "cleaned_request")]
    pub cleaned_request_snake: String,
    pub preview_text: String,
    #[serde(rename = "preview_text")]
    pub preview_text_snake: String,
    pub days: Vec<ParsedDayGroup>,
    pub warnings: Vec<&'static str>,
}

impl ExtractPlacesResponse {
    /// Build the wire response from a parse and the places to report.
    pub fn new(
        parse: &ParseResult,
        places: Vec<PlaceView>,
        summary: String,
        destination: Option<String>,
    ) -> Self {
        Self {
            success: true,
            places,
            summary,
            destination,
            cleaned_request: parse.cleaned_request.clone(),
            cleaned_request_snake: parse.cleaned_request.clone(),
            preview_text: parse.preview_text.clone(),
            preview_text_snake: parse.preview_text.clone(),
            days: parse.days.clone(),
            warnings: parse.warnings.iter().map(|w| w.as_str()).collect(),
        }
    }
}

/// Summary used when the LLM did not supply one.
pub fn fallback_summary(place_count: usize, day_count: usize) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    format!(
        "Found {} across {}.",
        plural(place_count, "place"),
        plural(day_count, "day")
    )
}

// ---------------------------------------------------------------------------
// POST /resolve-places
// ---------------------------------------------------------------------------

/// One place to resolve.
#[derive(Debug, Deserialize)]
pub struct PlaceInput {
    #[serde(default)]
    pub name: String,
    pub hint: Option<String>,
}

/// Batch resolution request. The shared context may use either casing.
#[derive(Debug, Deserialize)]
pub struct ResolvePlacesRequest {
    pub places: Option<Vec<PlaceInput>>,
    pub destination_context: Option<String>,
    #[serde(rename = "destinationContext")]
    pub destination_context_camel: Option<String>,
}

impl ResolvePlacesRequest {
    /// Shared destination, snake_case key first.
    pub fn destination(&self) -> Option<&str> {
        [&self.destination_context, &self.destination_context_camel]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .map(str::trim)
            .find(|d| !d.is_empty())
    }

    /// Inputs as resolver queries.
    pub fn queries(&self) -> Vec<PlaceQuery> {
        self.places
            .iter()
            .flatten()
            .map(|p| PlaceQuery {
                name: p.name.clone(),
                hint: p.hint.clone(),
            })
            .collect()
    }
}

/// One result of batch resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlaceView {
    pub name: String,
    pub resolved: bool,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub best_guess: Option<bool>,
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_components: Option<AddressParts>,
}

impl From<ResolvedPlace> for ResolvedPlaceView {
    fn from(place: ResolvedPlace) -> Self {
        Self {
            address: place.formatted_address.or(place.address),
            name: place.name,
            resolved: place.resolved,
            lat: place.lat,
            lng: place.lng,
            best_guess: place.best_guess,
            confidence: place.confidence,
            display_name: place.display_name,
            place_id: place.place_id,
            address_components: place.address_components,
        }
    }
}

/// Batch resolution response, in input order.
#[derive(Debug, Serialize)]
pub struct ResolvePlacesResponse {
    pub places: Vec<ResolvedPlaceView>,
}

// ---------------------------------------------------------------------------
// POST /geocode-place
// ---------------------------------------------------------------------------

/// Single-place geocode request.
#[derive(Debug, Deserialize)]
pub struct GeocodePlaceRequest {
    pub query: Option<String>,
    pub destination: Option<String>,
}

/// Single-place geocode response.
#[derive(Debug, Serialize)]
pub struct GeocodePlaceResponse {
    pub coordinates: Option<Coordinates>,
    pub success: bool,
}

impl GeocodePlaceResponse {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self {
            success: coordinates.is_some(),
            coordinates,
        }
    }
}

// ---------------------------------------------------------------------------
// GET /place-details
// ---------------------------------------------------------------------------

/// Reviews returned when `reviewLimit` is absent.
pub const DEFAULT_REVIEW_LIMIT: usize = 5;

/// Query string for the details view.
///
/// `reviewLimit` is kept as text so a malformed value falls back to the
/// default instead of failing the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsQuery {
    pub provider_place_id: Option<String>,
    pub query_text: Option<String>,
    pub destination_context: Option<String>,
    pub review_limit: Option<String>,
}

impl PlaceDetailsQuery {
    /// `reviewLimit` truncated to an integer and clamped to 1..=5; missing or
    /// non-numeric values give 5.
    pub fn review_limit(&self) -> usize {
        self.review_limit
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(|n| (n.trunc() as i64).clamp(1, DEFAULT_REVIEW_LIMIT as i64) as usize)
            .unwrap_or(DEFAULT_REVIEW_LIMIT)
    }
}

/// Canonical place details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsResponse {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_components: Option<AddressParts>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub maps_url: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub reviews: Vec<PlaceReview>,
}

impl PlaceDetailsResponse {
    /// Build the view, keeping at most `review_limit` reviews.
    pub fn from_details(place_id: &str, details: &PlaceResult, review_limit: usize) -> Self {
        let (lat, lng) = details.lat_lng();
        let address_components = details
            .address_components
            .as_deref()
            .map(crate::providers::google_address_parts)
            .filter(|parts| !parts.is_empty());

        Self {
            place_id: details
                .place_id
                .clone()
                .unwrap_or_else(|| place_id.to_string()),
            name: details.name.clone(),
            formatted_address: details.formatted_address.clone(),
            address_components,
            lat,
            lng,
            rating: details.rating,
            user_ratings_total: details.user_ratings_total,
            website: details.website.clone(),
            phone: details
                .formatted_phone_number
                .clone()
                .or_else(|| details.international_phone_number.clone()),
            maps_url: details.url.clone(),
            opening_hours: details.opening_hours.clone(),
            reviews: details
                .reviews
                .iter()
                .flatten()
                .take(review_limit)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_limit_is_clamped() {
        let query = |n: Option<&str>| PlaceDetailsQuery {
            provider_place_id: None,
            query_text: None,
            destination_context: None,
            review_limit: n.map(str::to_string),
        };
        assert_eq!(query(None).review_limit(), 5);
        assert_eq!(query(Some("0")).review_limit(), 1);
        assert_eq!(query(Some("-3")).review_limit(), 1);
        assert_eq!(query(Some("3")).review_limit(), 3);
        assert_eq!(query(Some("50")).review_limit(), 5);
    }

    #[test]
    fn review_limit_tolerates_junk() {
        let query = |n: &str| PlaceDetailsQuery {
            provider_place_id: None,
            query_text: None,
            destination_context: None,
            review_limit: Some(n.to_string()),
        };
        assert_eq!(query("abc").review_limit(), 5);
        assert_eq!(query("").review_limit(), 5);
        assert_eq!(query("NaN").review_limit(), 5);
        assert_eq!(query("inf").review_limit(), 5);
        assert_eq!(query("2.5").review_limit(), 2);
        assert_eq!(query(" 4 ").review_limit(), 4);
        assert_eq!(query("0.9").review_limit(), 1);
    }

    #[test]
    fn either_destination_casing() {
        let req: ResolvePlacesRequest = serde_json::from_value(serde_json::json!({
            "places": [{"name": "A"}],
            "destinationContext": "Penang"
        }))
        .unwrap();
        assert_eq!(req.destination(), Some("Penang"));

        let req: ResolvePlacesRequest = serde_json::from_value(serde_json::json!({
            "places": [],
            "destination_context": " ",
            "destinationContext": "Ipoh"
        }))
        .unwrap();
        assert_eq!(req.destination(), Some("Ipoh"));
    }

    #[test]
    fn llm_day_labels() {
        let view = PlaceView::from_extracted(&ExtractedPlace {
            name: " Kek Lok Si ".into(),
            day: Some(DayRef::Number(2)),
        });
        assert_eq!(view.name, "Kek Lok Si");
        assert_eq!(view.day.as_deref(), Some("Day 2"));
        assert_eq!(view.source, PlaceOrigin::Llm);
    }

    #[test]
    fn fallback_summary_pluralizes() {
        assert_eq!(fallback_summary(1, 1), "Found 1 place across 1 day.");
        assert_eq!(fallback_summary(0, 1), "Found 0 places across 1 day.");
        assert_eq!(fallback_summary(4, 2), "Found 4 places across 2 days.");
    }

    #[test]
    fn geocode_success_follows_coordinates() {
        assert!(!GeocodePlaceResponse::new(None).success);
        assert!(
            GeocodePlaceResponse::new(Some(Coordinates { lat: 1.0, lng: 2.0 })).success
        );
    }

    #[test]
    fn batch_view_prefers_formatted_address() {
        let mut place = ResolvedPlace::unresolved("X");
        place.address = Some("short".into());
        place.formatted_address = Some("long form".into());
        let view = ResolvedPlaceView::from(place);
        assert_eq!(view.address.as_deref(), Some("long form"));

        let json = serde_json::to_value(ResolvedPlaceView::from(ResolvedPlace::unresolved("Y")))
            .unwrap();
        assert_eq!(json["resolved"], false);
        assert!(json["lat"].is_null());
        assert!(json.get("displayName").is_none());
    }

    #[test]
    fn details_view_truncates_reviews() {
        let details = PlaceResult {
            name: Some("Hat Yai Municipal Park".into()),
            international_phone_number: Some("+66 74 000 000".into()),
            reviews: Some(
                (0..6)
                    .map(|i| PlaceReview {
                        author_name: Some(format!("r{i}")),
                        rating: Some(4.0),
                        text: None,
                        relative_time_description: None,
                        time: None,
                    })
                    .collect(),
            ),
            ..Default::default()
        };
        let view = PlaceDetailsResponse::from_details("pid", &details, 2);
        assert_eq!(view.place_id, "pid");
        assert_eq!(view.reviews.len(), 2);
        assert_eq!(view.phone.as_deref(), Some("+66 74 000 000"));
        assert!(view.opening_hours.is_none());
    }

    #[test]
    fn details_view_uses_camel_case_keys() {
        let details = PlaceResult {
            opening_hours: Some(OpeningHours {
                open_now: Some(false),
                weekday_text: vec!["Monday: Closed".into()],
            }),
            reviews: Some(vec![PlaceReview {
                author_name: Some("Aom".into()),
                rating: Some(5.0),
                text: Some("Shady and calm".into()),
                relative_time_description: Some("a week ago".into()),
                time: Some(1_700_000_000),
            }]),
            ..Default::default()
        };
        let json =
            serde_json::to_value(PlaceDetailsResponse::from_details("pid", &details, 5)).unwrap();
        assert_eq!(json["openingHours"]["openNow"], false);
        assert_eq!(json["openingHours"]["weekdayText"][0], "Monday: Closed");
        assert_eq!(json["reviews"][0]["authorName"], "Aom");
        assert_eq!(json["reviews"][0]["relativeTime"], "a week ago");
        assert!(json["reviews"][0].get("relative_time_description").is_none());
    }

    #[test]
    fn day_groups_serialize_with_camel_case_places() {
        let mut day = ParsedDayGroup::new("Day 2", Some("12/3".into()));
        day.places.push(ParsedPlace::new("Khlong Hae Floating Market", Some("4pm".into())));
        day.places.push(ParsedPlace::new("Lee Garden Plaza", None));
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["label"], "Day 2");
        assert_eq!(json["date"], "12/3");
        assert_eq!(json["places"][0]["timeText"], "4pm");
        assert_eq!(json["places"][0]["source"], "user");
        assert!(json["places"][1].get("timeText").is_none());
    }
}
