//! Geocoding and places provider adapters.
//!
//! Three independent providers with three different response shapes:
//! - Google Places Text Search (+ Place Details), keyed
//! - Google Geocoding, keyed
//! - OpenStreetMap Nominatim, keyless
//!
//! The clients only fetch and decode. Mapping into the common
//! [`crate::place::ResolvedPlace`] shape lives in [`convert`].

mod convert;
mod error;
mod google;
mod http;
mod nominatim;
mod types;

pub use convert::{
    Assessment, ResolutionCandidate, google_address_parts, nominatim_address_parts,
};
pub use error::ProviderError;
pub use google::{FULL_DETAIL_FIELDS, GoogleClient, GoogleConfig, RESOLVE_DETAIL_FIELDS};
pub use nominatim::{DEFAULT_USER_AGENT, NominatimClient, NominatimConfig};
pub use types::{
    AddressComponent, GeocodeResult, Geometry, LatLng, NominatimResult, OpeningHours,
    PlaceResult, PlaceReview,
};
