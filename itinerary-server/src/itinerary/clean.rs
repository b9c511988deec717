//! Pure string transforms applied to raw itinerary lines.
//!
//! The steps in [`clean_line`] run in a fixed order: emoji are removed before
//! bullet and asterisk stripping so that a decorated line like `"📍 - Wat Pho **"`
//! exposes its markers to the later patterns.

use std::sync::LazyLock;

use regex::Regex;

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\u{200D}\u{20E3}]")
        .expect("valid emoji regex")
});

static VARIATION_SELECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{FE00}-\u{FE0F}]").expect("valid variation selector regex"));

static LEADING_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\-*•·▪◦‣–—]+").expect("valid bullet regex"));

static TRAILING_ASTERISK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s*]+$").expect("valid trailing asterisk regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static LEADING_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<time>\d{1,2}[:.]\d{2}(?:\s*[ap]m)?|\d{1,2}\s*[ap]m)\b[\s\-–:>]*")
        .expect("valid leading time regex")
});

static TRAILING_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*(?:[-–@(]|\bat\b|\baround\b|\bby\b)?\s*\b(?:\d{1,2}[:.]\d{2}(?:\s*[ap]m)?|\d{1,2}\s*[ap]m)\b\)?\s*$",
    )
    .expect("valid trailing time regex")
});

static LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}").expect("valid letter regex"));

/// Normalize a raw line: drop emoji and variation selectors, strip leading
/// bullets and trailing asterisks, collapse whitespace.
///
/// Idempotent: `clean_line(&clean_line(x)) == clean_line(x)`.
pub fn clean_line(raw: &str) -> String {
    let s = EMOJI_RE.replace_all(raw, " ");
    let s = VARIATION_SELECTOR_RE.replace_all(&s, "");
    let s = LEADING_BULLET_RE.replace(&s, "");
    let s = TRAILING_ASTERISK_RE.replace(&s, "");
    let s = WHITESPACE_RE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Split a leading time token off a cleaned line.
///
/// Returns `(time, remainder)` with both trimmed, or `None` if the line does
/// not start with a time.
pub fn split_leading_time(line: &str) -> Option<(String, String)> {
    let caps = LEADING_TIME_RE.captures(line)?;
    let whole = caps.get(0)?;
    let time = caps.name("time")?.as_str().trim().to_string();
    let rest = line[whole.end()..].trim().to_string();
    Some((time, rest))
}

/// Remove a trailing time token such as `" at 3pm"`, `" - 11:30"` or `" (5pm)"`.
pub fn strip_trailing_time(text: &str) -> String {
    TRAILING_TIME_RE.replace(text, "").trim().to_string()
}

/// Whether the text contains at least one Unicode letter.
pub fn has_letter(text: &str) -> bool {
    LETTER_RE.is_match(text)
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
