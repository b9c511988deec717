//! Canonical resolved place types.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Which provider produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// Google Places Text Search (+ Place Details).
    Places,
    /// Google Geocoding API.
    Geocoding,
    /// OpenStreetMap Nominatim.
    Nominatim,
}

/// How much the resolver trusts a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// City / region / country extracted from a provider's address breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressParts {
    /// True when no part is known.
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.region.is_none() && self.country.is_none()
    }
}

/// Result of resolving one place name.
///
/// `resolved: false` with only `name` set means the name could not be
/// resolved by any provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    /// The query as given by the caller.
    pub name: String,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_components: Option<AddressParts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResolutionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_guess: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl ResolvedPlace {
    /// The canonical "could not resolve" value.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: false,
            display_name: None,
            place_id: None,
            formatted_address: None,
            address: None,
            address_components: None,
            lat: None,
            lng: None,
            source: None,
            best_guess: None,
            confidence: None,
        }
    }

    /// Coordinates, if both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_serializes_name_only() {
        let json = serde_json::to_value(ResolvedPlace::unresolved("Nowhere")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Nowhere", "resolved": false }));
    }

    #[test]
    fn coordinates_need_both_halves() {
        let mut place = ResolvedPlace::unresolved("x");
        place.lat = Some(1.0);
        assert_eq!(place.coordinates(), None);
        place.lng = Some(2.0);
        assert_eq!(place.coordinates(), Some(Coordinates { lat: 1.0, lng: 2.0 }));
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&ResolutionSource::Nominatim).unwrap(),
            "\"nominatim\""
        );
    }
}
