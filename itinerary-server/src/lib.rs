//! Itinerary place server.
//!
//! Turns pasted trip notes into day-grouped place names, then resolves each
//! name to a geocoded place through Google Places, Google Geocoding and
//! Nominatim in turn.

pub mod cache;
pub mod config;
pub mod itinerary;
pub mod llm;
pub mod place;
pub mod providers;
pub mod resolve;
pub mod store;
pub mod web;
