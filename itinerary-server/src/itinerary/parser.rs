//! Itinerary parser.
//!
//! Drives [`classify_line`] over every line and groups place candidates into
//! days. The parser holds two pieces of state: the day being filled and
//! whether any day header has been seen.

use std::collections::BTreeSet;

use tracing::debug;

use super::classify::{LineClass, classify_line};
use super::types::{DEFAULT_DAY_LABEL, ParseResult, ParseWarning, ParsedDayGroup, ParsedPlace};

/// Accumulates day groups while lines are fed in.
#[derive(Debug)]
struct DayAccumulator {
    days: Vec<ParsedDayGroup>,
    current: ParsedDayGroup,
    saw_header: bool,
}

impl DayAccumulator {
    fn new() -> Self {
        Self {
            days: Vec::new(),
            current: ParsedDayGroup::first_day(),
            saw_header: false,
        }
    }

    /// Push the current day if forced, non-empty, or it would be the only group.
    fn commit(&mut self, force: bool, next: ParsedDayGroup) {
        let day = std::mem::replace(&mut self.current, next);
        if force || !day.places.is_empty() || self.days.is_empty() {
            self.days.push(day);
        }
    }

    fn feed(&mut self, class: LineClass) {
        match class {
            LineClass::DayHeader { label, date } => {
                let next = ParsedDayGroup::new(label, date);
                if self.saw_header {
                    self.commit(true, next);
                } else if !self.current.places.is_empty() {
                    self.commit(false, next);
                } else {
                    self.current = next;
                }
                self.saw_header = true;
            }
            LineClass::Place { name, time_text } => {
                self.current.places.push(ParsedPlace::new(name, time_text));
            }
            LineClass::Blank | LineClass::Noise | LineClass::TravelOnly | LineClass::Excluded => {}
        }
    }

    fn finish(mut self) -> Vec<ParsedDayGroup> {
        let force = self.saw_header;
        self.commit(force, ParsedDayGroup::first_day());
        if !self.saw_header
            && let Some(only) = self.days.first_mut()
        {
            only.label = DEFAULT_DAY_LABEL.to_string();
        }
        self.days
    }
}

/// Parse free-form itinerary text into day groups.
///
/// `destination_hint` is echoed into the result and the cleaned request.
pub fn parse_itinerary(text: &str, destination_hint: Option<&str>) -> ParseResult {
    let mut acc = DayAccumulator::new();
    for line in text.lines() {
        acc.feed(classify_line(line));
    }
    let days = acc.finish();

    let mut warnings = BTreeSet::new();
    if days.iter().all(|d| d.places.is_empty()) {
        warnings.insert(ParseWarning::NoPlacesFound);
    }

    let destination = destination_hint
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let cleaned_request = build_cleaned_request(destination.as_deref(), &days);

    debug!(
        days = days.len(),
        places = days.iter().map(|d| d.places.len()).sum::<usize>(),
        "parsed itinerary"
    );

    ParseResult {
        preview_text: cleaned_request.clone(),
        cleaned_request,
        destination,
        days,
        warnings,
    }
}

/// Restate the day groups as a natural-language request.
///
/// Day labels are only written when there is more than one day.
pub fn build_cleaned_request(destination: Option<&str>, days: &[ParsedDayGroup]) -> String {
    let mut out = match destination {
        Some(dest) => format!("I'm planning a trip to {dest}."),
        None => "I'm planning a trip.".to_string(),
    };
    out.push_str("\n\nPlaces from my itinerary:");

    let label_days = days.len() > 1;
    for day in days {
        if label_days {
            out.push('\n');
            out.push_str(&day.label);
        }
        for place in &day.places {
            out.push_str("\n- ");
            out.push_str(&place.name);
        }
    }
    out
}
