//! Lenient date parsing for report columns.
//!
//! Source files carry dates in whatever shape the upstream tool produced,
//! sometimes embedded in surrounding text. `parse_date` accepts a catalogue
//! of common formats and falls back to scanning embedded tokens; anything
//! unparseable maps to `None`, the null sentinel.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a date out of free-form text, or returns `None` when the input is
/// blank or malformed.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = parse_exact(trimmed) {
        return Some(date);
    }

    // Scan embedded token windows, longest first, so "March 5, 2024" beats
    // its own fragments.
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    for window in (1..=3usize.min(tokens.len())).rev() {
        for chunk in tokens.windows(window) {
            let candidate = chunk.join(" ");
            let candidate =
                candidate.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '(' | ')'));
            if let Some(date) = parse_exact(candidate) {
                return Some(date);
            }
        }
    }
    None
}

fn parse_exact(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if let Some(date) = plausible(date) {
                return Some(date);
            }
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            if let Some(date) = plausible(stamp.date()) {
                return Some(date);
            }
        }
    }
    None
}

// Two-digit years satisfy %Y as years 0-99; reject them so the %y formats
// get their turn.
fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1900..=2100).contains(&date.year()).then_some(date)
}
