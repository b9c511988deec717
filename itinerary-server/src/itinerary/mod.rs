//! Rule-based itinerary parsing.
//!
//! Turns pasted notes, OCR output, or chat-style trip descriptions into day
//! groups of candidate place names. This is the deterministic path that runs
//! before LLM extraction and stands in for it when the model is unavailable.

mod classify;
mod clean;
mod parser;
mod types;

pub use classify::{LineClass, RULES, Rule, classify_line, classify_with_rule, extract_arrival_place};
pub use clean::{clean_line, strip_trailing_time};
pub use parser::{build_cleaned_request, parse_itinerary};
pub use types::{
    DEFAULT_DAY_LABEL, ParseResult, ParseWarning, ParsedDayGroup, ParsedPlace, PlaceSource,
};
