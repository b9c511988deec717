//! Parsed itinerary types.

use serde::Serialize;

/// Where a parsed place came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    /// Typed (or pasted) by the traveler.
    User,
}

/// A candidate place name pulled out of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPlace {
    /// Cleaned place name.
    pub name: String,
    /// Always [`PlaceSource::User`] for rule-based extraction.
    pub source: PlaceSource,
    /// Leading time token stripped from the line, e.g. "9am" or "11.30".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_text: Option<String>,
}

impl ParsedPlace {
    /// Create a user-sourced place.
    pub fn new(name: impl Into<String>, time_text: Option<String>) -> Self {
        Self {
            name: name.into(),
            source: PlaceSource::User,
            time_text,
        }
    }
}

/// One day of the itinerary.
///
/// `places` is in visit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDayGroup {
    /// Header label, e.g. "Day 2" or "12/3".
    pub label: String,
    /// Date token found in the header, if any.
    pub date: Option<String>,
    /// Places in the order they appeared.
    pub places: Vec<ParsedPlace>,
}

impl ParsedDayGroup {
    /// Create an empty group with the given label.
    pub fn new(label: impl Into<String>, date: Option<String>) -> Self {
        Self {
            label: label.into(),
            date,
            places: Vec::new(),
        }
    }

    /// The synthetic group used before any header is seen.
    pub fn first_day() -> Self {
        Self::new(DEFAULT_DAY_LABEL, None)
    }
}

/// Label used when no day header is present.
pub const DEFAULT_DAY_LABEL: &str = "Day 1";

/// Non-fatal quality warnings attached to a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseWarning {
    /// Every day group came out empty.
    NoPlacesFound,
}

impl ParseWarning {
    /// Wire code, e.g. `NO_PLACES_FOUND`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseWarning::NoPlacesFound => "NO_PLACES_FOUND",
        }
    }
}

/// Output of [`super::parse_itinerary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Natural-language restatement built from the day groups.
    pub cleaned_request: String,
    /// Identical to `cleaned_request`; kept as its own field for callers that
    /// display it.
    pub preview_text: String,
    /// Destination hint as supplied by the caller, trimmed.
    pub destination: Option<String>,
    /// Day groups in input order.
    pub days: Vec<ParsedDayGroup>,
    /// Quality warnings, deduplicated.
    pub warnings: std::collections::BTreeSet<ParseWarning>,
}

impl ParseResult {
    /// All places across all days, in order.
    pub fn places(&self) -> impl Iterator<Item = (&ParsedDayGroup, &ParsedPlace)> {
        self.days
            .iter()
            .flat_map(|day| day.places.iter().map(move |place| (day, place)))
    }

    /// Total number of places across all days.
    pub fn place_count(&self) -> usize {
        self.days.iter().map(|d| d.places.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_wire_code() {
        assert_eq!(ParseWarning::NoPlacesFound.as_str(), "NO_PLACES_FOUND");
        assert_eq!(
            serde_json::to_string(&ParseWarning::NoPlacesFound).unwrap(),
            "\"NO_PLACES_FOUND\""
        );
    }

    #[test]
    fn place_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PlaceSource::User).unwrap(), "\"user\"");
    }
}
