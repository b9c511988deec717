//! Destination matching.
//!
//! Decides whether a provider result plausibly belongs to a destination like
//! `"Hat Yai, Thailand"`. The destination is split on commas into parts and
//! each part is looked for as a plain substring of the result's text fields.

use crate::providers::ResolutionCandidate;

/// Matching strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every destination part must appear in some field.
    All,
    /// At least one destination part must appear in some field.
    Any,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Lowercased, trimmed, non-empty comma-separated parts of a destination.
pub fn destination_parts(destination: &str) -> Vec<String> {
    destination
        .split(',')
        .map(normalize)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Normalized text fields of a candidate.
pub fn haystacks(candidate: &ResolutionCandidate) -> Vec<String> {
    candidate
        .text_fields()
        .into_iter()
        .map(normalize)
        .filter(|h| !h.is_empty())
        .collect()
}

/// Whether `candidate` matches `destination` under `mode`.
///
/// A destination with no usable parts places no constraint and always matches.
pub fn matches(candidate: &ResolutionCandidate, destination: &str, mode: MatchMode) -> bool {
    let parts = destination_parts(destination);
    if parts.is_empty() {
        return true;
    }
    let haystacks = haystacks(candidate);
    let found = |part: &String| haystacks.iter().any(|h| h.contains(part.as_str()));
    match mode {
        MatchMode::All => parts.iter().all(found),
        MatchMode::Any => parts.iter().any(found),
    }
}

/// Index of the first candidate matching under `mode`.
pub fn find_match(
    candidates: &[ResolutionCandidate],
    destination: &str,
    mode: MatchMode,
) -> Option<usize> {
    candidates
        .iter()
        .position(|c| matches(c, destination, mode))
}

/// Pick a candidate: strict match, then loose match.
///
/// Without a destination the first candidate is taken. With a destination and
/// no match, `None`.
pub fn select_candidate(candidates: &[ResolutionCandidate], destination: Option<&str>) -> Option<usize> {
    match destination {
        Some(dest) => find_match(candidates, dest, MatchMode::All)
            .or_else(|| find_match(candidates, dest, MatchMode::Any)),
        None => (!candidates.is_empty()).then_some(0),
    }
}
