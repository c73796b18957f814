//! Column lookup across reports whose headers disagree on spelling.
//!
//! Logical names are resolved with [`find_column()`] (exact after normalization).
//! Key columns whose names vary more widely between exports ("Merchant SKU",
//! "SKU#", "sku") are found by substring with [`find_columns_containing()`], once
//! per table through [`SkuColumns`].

use crate::{
    data::{CellValue, Row, SourceTable},
    normalize::normalize_for_match,
};

/// Substring every SKU-like header contains.
pub const SKU_MARKER: &str = "sku";

/// Returns the label of the first column whose normalized form equals `logical_name`.
pub fn find_column_label<'a>(row: &'a Row, logical_name: &str) -> Option<&'a str> {
    let wanted = normalize_for_match(logical_name);
    row.headers()
        .iter()
        .find(|label| normalize_for_match(label) == wanted)
        .map(String::as_str)
}

/// Returns the value stored under the column matching `logical_name`.
pub fn find_column<'a>(row: &'a Row, logical_name: &str) -> Option<&'a CellValue> {
    let wanted = normalize_for_match(logical_name);
    row.iter()
        .find(|(label, _)| normalize_for_match(label) == wanted)
        .map(|(_, value)| value)
}

/// Case-insensitive substring search over `headers`, in header order.
pub fn find_columns_containing<S: AsRef<str>>(headers: &[S], substring: &str) -> Vec<String> {
    let needle = substring.to_lowercase();
    headers
        .iter()
        .map(AsRef::as_ref)
        .filter(|header| header.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect()
}

/// The SKU-like columns of one table, discovered once from its first row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuColumns {
    labels: Vec<String>,
}

impl SkuColumns {
    pub fn discover(table: &SourceTable) -> Self {
        let labels = table
            .rows()
            .first()
            .map(|row| find_columns_containing(row.headers(), SKU_MARKER))
            .unwrap_or_default();
        SkuColumns { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Values of the SKU-like columns of `row`, in column order.
    pub fn values<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.labels.iter().filter_map(move |label| row.get(label))
    }
}
