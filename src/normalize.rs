//! Canonical forms for column labels and cell values.
//!
//! Source reports exported from different tools disagree on whitespace: Excel exports
//! carry non-breaking spaces, flat-file reports carry stray newlines inside quoted
//! headers. Every comparison in the crate (column lookup, SKU matching, marketplace
//! filtering) goes through [`normalize_for_match()`] so that this noise never decides
//! whether two keys are equal.

use std::borrow::Cow;

use crate::data::CellValue;

const NBSP: char = '\u{a0}';

/// Strips surrounding whitespace and non-breaking spaces, turns embedded non-breaking
/// spaces into regular spaces, and drops embedded line breaks.
pub fn normalize(value: &str) -> String {
    // `char::is_whitespace` covers U+00A0, so `trim` strips leading/trailing NBSP too.
    let trimmed = value.trim();
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            NBSP => out.push(' '),
            '\n' | '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// [`normalize()`] followed by case folding. Used for all key comparisons.
pub fn normalize_for_match(value: &str) -> String {
    normalize(value).to_lowercase()
}

/// Normalizes an optional cell. Absent and empty cells both become `""`.
pub fn normalize_cell(value: Option<&CellValue>) -> String {
    match value {
        None | Some(CellValue::Empty) => String::new(),
        Some(other) => normalize(&other.as_display()),
    }
}

/// Matching form of an optional cell.
pub fn match_key(value: Option<&CellValue>) -> String {
    normalize_cell(value).to_lowercase()
}

/// Light cleaning applied to loaded cell values: trims and removes line breaks,
/// keeping case and inner spacing.
pub fn clean_value(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim();
    if trimmed.contains(['\n', '\r']) {
        Cow::Owned(trimmed.chars().filter(|c| !matches!(c, '\n' | '\r')).collect())
    } else {
        Cow::Borrowed(trimmed)
    }
}
