//! Place resolution: destination matching and the provider fallback chain.

mod matcher;
mod resolver;


pub use matcher::{MatchMode, destination_parts, find_match, matches, select_candidate};
pub use resolver::{PlaceQuery, PlaceResolver, ResolveError, search_text};
