//! Provider response DTOs.
//!
//! These map directly to the Google Places, Google Geocoding, and Nominatim
//! JSON responses. Fields are `Option` almost everywhere because each provider
//! omits whatever it does not know about a place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `geometry.location` in Google responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// `geometry` in Google responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

/// One entry of Google's `address_components[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Envelope for Places Text Search.
#[derive(Debug, Clone, Deserialize)]
pub struct TextSearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    pub error_message: Option<String>,
}

/// Envelope for Place Details.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    pub result: Option<PlaceResult>,
    pub error_message: Option<String>,
}

/// A place from Text Search or Place Details.
///
/// Text Search fills the identity and location fields; Details adds the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub address_components: Option<Vec<AddressComponent>>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub website: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub url: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub reviews: Option<Vec<PlaceReview>>,
}

impl PlaceResult {
    /// `geometry.location` flattened.
    pub fn lat_lng(&self) -> (Option<f64>, Option<f64>) {
        location_of(self.geometry.as_ref())
    }
}

/// `opening_hours` in Place Details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// A review in Place Details.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PlaceReview {
    pub author_name: Option<String>,
    pub rating: Option<f64>,
    pub text: Option<String>,
    #[serde(rename(serialize = "relativeTime"))]
    pub relative_time_description: Option<String>,
    pub time: Option<i64>,
}

/// Envelope for the Geocoding API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

/// A Geocoding API result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResult {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub address_components: Option<Vec<AddressComponent>>,
}

impl GeocodeResult {
    /// `geometry.location` flattened.
    pub fn lat_lng(&self) -> (Option<f64>, Option<f64>) {
        location_of(self.geometry.as_ref())
    }
}

fn location_of(geometry: Option<&Geometry>) -> (Option<f64>, Option<f64>) {
    geometry
        .and_then(|g| g.location.as_ref())
        .map_or((None, None), |loc| (loc.lat, loc.lng))
}

/// A Nominatim `/search` result (`format=json`, `addressdetails=1`).
///
/// Nominatim sends coordinates as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimResult {
    pub place_id: Option<serde_json::Value>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub display_name: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub address: HashMap<String, serde_json::Value>,
}

impl NominatimResult {
    /// Parsed `(lat, lon)`, each `None` if missing or not a number.
    pub fn lat_lng(&self) -> (Option<f64>, Option<f64>) {
        let parse = |s: &Option<String>| s.as_deref().and_then(|v| v.trim().parse::<f64>().ok());
        (parse(&self.lat), parse(&self.lon))
    }

    /// String value of an `address` field.
    pub fn address_field(&self, key: &str) -> Option<&str> {
        self.address.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_search_parses_partial_results() {
        let json = r#"{
            "status": "OK",
            "results": [
                {"place_id": "abc", "name": "Wat Pho", "geometry": {"location": {"lat": 13.74, "lng": 100.49}}},
                {"name": "No geometry"}
            ]
        }"#;
        let resp: TextSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].lat_lng(), (Some(13.74), Some(100.49)));
        assert_eq!(resp.results[1].lat_lng(), (None, None));
    }

    #[test]
    fn error_status_without_results() {
        let json = r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#;
        let resp: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "REQUEST_DENIED");
        assert!(resp.results.is_empty());
        assert_eq!(resp.error_message.as_deref(), Some("bad key"));
    }

    #[test]
    fn nominatim_string_coordinates() {
        let json = r#"[{
            "place_id": 12345,
            "lat": "7.0086",
            "lon": "100.4747",
            "display_name": "Hat Yai, Songkhla, Thailand",
            "address": {"city": "Hat Yai", "state": "Songkhla Province", "country": "Thailand", "country_code": "th"}
        }]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        assert_eq!(results[0].lat_lng(), (Some(7.0086), Some(100.4747)));
        assert_eq!(results[0].address_field("city"), Some("Hat Yai"));
    }

    #[test]
    fn nominatim_bad_coordinates_are_none() {
        let result = NominatimResult {
            lat: Some("north".to_string()),
            lon: None,
            ..Default::default()
        };
        assert_eq!(result.lat_lng(), (None, None));
    }
}
