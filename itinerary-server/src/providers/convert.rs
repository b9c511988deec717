//! Conversion from provider DTOs to [`ResolvedPlace`].
//!
//! Each provider's field paths stay in this module; the resolver only sees
//! [`ResolutionCandidate`] and the common output shape.

use crate::place::{AddressParts, Confidence, ResolutionSource, ResolvedPlace};

use super::types::{AddressComponent, GeocodeResult, NominatimResult, PlaceResult};

/// A raw provider record before normalization.
#[derive(Debug, Clone)]
pub enum ResolutionCandidate {
    Places(PlaceResult),
    Geocoding(GeocodeResult),
    Nominatim(NominatimResult),
}

/// How a candidate was chosen, which fixes its confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub confidence: Confidence,
    pub best_guess: bool,
}

impl ResolutionCandidate {
    /// Every text field a destination could appear in, in raw form.
    pub fn text_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        match self {
            ResolutionCandidate::Places(p) => {
                fields.extend(p.name.as_deref());
                fields.extend(p.formatted_address.as_deref());
                push_components(&mut fields, p.address_components.as_deref());
            }
            ResolutionCandidate::Geocoding(g) => {
                fields.extend(g.formatted_address.as_deref());
                push_components(&mut fields, g.address_components.as_deref());
            }
            ResolutionCandidate::Nominatim(n) => {
                fields.extend(n.display_name.as_deref());
                fields.extend(n.name.as_deref());
                fields.extend(n.address.values().filter_map(|v| v.as_str()));
            }
        }
        fields
    }

    /// Normalize into a [`ResolvedPlace`] for `query`.
    ///
    /// `resolved` follows each provider's rule: Places needs non-zero
    /// coordinates, Geocoding and Nominatim need numeric ones.
    pub fn into_resolved(self, query: &str, assessment: Assessment) -> ResolvedPlace {
        match self {
            ResolutionCandidate::Places(p) => from_places(p, query, assessment),
            ResolutionCandidate::Geocoding(g) => from_geocoding(g, query, assessment),
            ResolutionCandidate::Nominatim(n) => from_nominatim(n, query, assessment),
        }
    }
}

fn push_components<'a>(fields: &mut Vec<&'a str>, components: Option<&'a [AddressComponent]>) {
    for component in components.unwrap_or(&[]) {
        fields.extend(component.long_name.as_deref());
        fields.extend(component.short_name.as_deref());
    }
}

fn non_empty(parts: AddressParts) -> Option<AddressParts> {
    (!parts.is_empty()).then_some(parts)
}

/// City/region/country from Google `address_components`.
pub fn google_address_parts(components: &[AddressComponent]) -> AddressParts {
    let find = |wanted: &[&str]| {
        wanted.iter().find_map(|ty| {
            components
                .iter()
                .find(|c| c.types.iter().any(|t| t == ty))
                .and_then(|c| c.long_name.clone())
        })
    };
    AddressParts {
        city: find(&["locality", "postal_town", "administrative_area_level_2"]),
        region: find(&["administrative_area_level_1"]),
        country: find(&["country"]),
    }
}

/// City/region/country from a Nominatim `address` object.
pub fn nominatim_address_parts(result: &NominatimResult) -> AddressParts {
    let first = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| result.address_field(k))
            .map(str::to_string)
    };
    AddressParts {
        city: first(&["city", "town", "village", "municipality", "county"]),
        region: first(&["state", "province", "region"]),
        country: first(&["country"]),
    }
}

fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

fn from_places(p: PlaceResult, query: &str, a: Assessment) -> ResolvedPlace {
    let (lat, lng) = p.lat_lng();
    let (lat, lng) = (truthy(lat), truthy(lng));
    let address_components = p
        .address_components
        .as_deref()
        .map(google_address_parts)
        .and_then(non_empty);

    ResolvedPlace {
        name: query.to_string(),
        resolved: lat.is_some() && lng.is_some(),
        display_name: p.name,
        place_id: p.place_id,
        address: p.formatted_address.clone(),
        formatted_address: p.formatted_address,
        address_components,
        lat,
        lng,
        source: Some(ResolutionSource::Places),
        best_guess: Some(a.best_guess),
        confidence: Some(a.confidence),
    }
}

fn from_geocoding(g: GeocodeResult, query: &str, a: Assessment) -> ResolvedPlace {
    let (lat, lng) = g.lat_lng();
    let (lat, lng) = (lat.filter(|v| v.is_finite()), lng.filter(|v| v.is_finite()));
    let address_components = g
        .address_components
        .as_deref()
        .map(google_address_parts)
        .and_then(non_empty);

    ResolvedPlace {
        name: query.to_string(),
        resolved: lat.is_some() && lng.is_some(),
        display_name: g.formatted_address.clone(),
        place_id: g.place_id,
        address: g.formatted_address.clone(),
        formatted_address: g.formatted_address,
        address_components,
        lat,
        lng,
        source: Some(ResolutionSource::Geocoding),
        best_guess: Some(a.best_guess),
        confidence: Some(a.confidence),
    }
}

fn from_nominatim(n: NominatimResult, query: &str, a: Assessment) -> ResolvedPlace {
    let (lat, lng) = n.lat_lng();
    let (lat, lng) = (lat.filter(|v| v.is_finite()), lng.filter(|v| v.is_finite()));
    let address_components = non_empty(nominatim_address_parts(&n));
    let place_id = n.place_id.as_ref().and_then(|id| match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(num) => Some(num.to_string()),
        _ => None,
    });

    ResolvedPlace {
        name: query.to_string(),
        resolved: lat.is_some() && lng.is_some(),
        display_name: n.name.filter(|s| !s.is_empty()).or_else(|| n.display_name.clone()),
        place_id,
        address: n.display_name.clone(),
        formatted_address: n.display_name,
        address_components,
        lat,
        lng,
        source: Some(ResolutionSource::Nominatim),
        best_guess: Some(a.best_guess),
        confidence: Some(a.confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::{Geometry, LatLng};

    fn component(long: &str, short: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: Some(long.to_string()),
            short_name: Some(short.to_string()),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn geometry(lat: f64, lng: f64) -> Option<Geometry> {
        Some(Geometry {
            location: Some(LatLng {
                lat: Some(lat),
                lng: Some(lng),
            }),
        })
    }

    const HIGH: Assessment = Assessment {
        confidence: Confidence::High,
        best_guess: false,
    };

    #[test]
    fn places_mapping() {
        let result = PlaceResult {
            place_id: Some("p1".into()),
            name: Some("Wat Pho".into()),
            formatted_address: Some("2 Sanam Chai Rd, Bangkok 10200, Thailand".into()),
            geometry: geometry(13.7465, 100.4927),
            address_components: Some(vec![
                component("Bangkok", "Bangkok", &["locality", "political"]),
                component("Krung Thep Maha Nakhon", "Krung Thep Maha Nakhon", &["administrative_area_level_1"]),
                component("Thailand", "TH", &["country", "political"]),
            ]),
            ..Default::default()
        };

        let resolved = ResolutionCandidate::Places(result).into_resolved("wat pho", HIGH);
        assert!(resolved.resolved);
        assert_eq!(resolved.name, "wat pho");
        assert_eq!(resolved.display_name.as_deref(), Some("Wat Pho"));
        assert_eq!(resolved.place_id.as_deref(), Some("p1"));
        assert_eq!(resolved.address, resolved.formatted_address);
        assert_eq!(resolved.source, Some(ResolutionSource::Places));
        assert_eq!(resolved.confidence, Some(Confidence::High));
        assert_eq!(resolved.best_guess, Some(false));
        let parts = resolved.address_components.unwrap();
        assert_eq!(parts.city.as_deref(), Some("Bangkok"));
        assert_eq!(parts.country.as_deref(), Some("Thailand"));
    }

    #[test]
    fn places_zero_coordinate_is_unresolved() {
        let result = PlaceResult {
            name: Some("Null Island".into()),
            geometry: geometry(0.0, 12.0),
            ..Default::default()
        };
        let resolved = ResolutionCandidate::Places(result).into_resolved("x", HIGH);
        assert!(!resolved.resolved);
    }

    #[test]
    fn geocoding_zero_coordinate_is_resolved() {
        let result = GeocodeResult {
            formatted_address: Some("Somewhere".into()),
            geometry: geometry(0.0, 12.0),
            ..Default::default()
        };
        let resolved = ResolutionCandidate::Geocoding(result).into_resolved("x", HIGH);
        assert!(resolved.resolved);
        assert_eq!(resolved.source, Some(ResolutionSource::Geocoding));
    }

    #[test]
    fn nominatim_mapping() {
        let result: NominatimResult = serde_json::from_value(serde_json::json!({
            "place_id": 4242,
            "lat": "7.0086",
            "lon": "100.4747",
            "name": "Kim Yong Market",
            "display_name": "Kim Yong Market, Hat Yai, Songkhla Province, Thailand",
            "address": {"town": "Hat Yai", "state": "Songkhla Province", "country": "Thailand"}
        }))
        .unwrap();

        let candidate = ResolutionCandidate::Nominatim(result);
        assert!(candidate.text_fields().contains(&"Songkhla Province"));

        let resolved = candidate.into_resolved(
            "Kim Yong",
            Assessment {
                confidence: Confidence::Low,
                best_guess: true,
            },
        );
        assert!(resolved.resolved);
        assert_eq!(resolved.place_id.as_deref(), Some("4242"));
        assert_eq!(resolved.display_name.as_deref(), Some("Kim Yong Market"));
        let parts = resolved.address_components.unwrap();
        assert_eq!(parts.city.as_deref(), Some("Hat Yai"));
        assert_eq!(parts.region.as_deref(), Some("Songkhla Province"));
    }

    #[test]
    fn text_fields_cover_components() {
        let result = GeocodeResult {
            formatted_address: Some("Kuala Lumpur".into()),
            address_components: Some(vec![component("Malaysia", "MY", &["country"])]),
            ..Default::default()
        };
        let candidate = ResolutionCandidate::Geocoding(result);
        let fields = candidate.text_fields();
        assert_eq!(fields, ["Kuala Lumpur", "Malaysia", "MY"]);
    }
}
