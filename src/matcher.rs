//! SKU matching across source reports.
//!
//! The restock report defines the target SKUs; every source (the restock report
//! included) is then scanned once for the first row carrying each target in one of
//! its SKU-like columns. Matches are keyed by the normalized SKU.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::{
    columns::{SkuColumns, find_column},
    data::{Row, SourceName, SourceTable},
    error::{ReconcileError, ReconcileResult},
    normalize::{match_key, normalize_cell, normalize_for_match},
};

/// Exact header every restock row must carry.
pub const MERCHANT_SKU: &str = "Merchant SKU";
/// Column used to restrict a source to one marketplace.
pub const MARKETPLACE_ID: &str = "MARKETPLACE_ID";

/// Reads the mandatory merchant SKU of every restock row, in row order.
///
/// Rows whose SKU is blank are skipped; a blank key would otherwise pair with every
/// blank SKU cell of the other reports.
pub fn extract_target_skus(rows: &[Row]) -> ReconcileResult<Vec<String>> {
    let mut skus = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let value = row
            .get(MERCHANT_SKU)
            .ok_or_else(|| ReconcileError::MissingKeyColumn {
                column: MERCHANT_SKU.to_string(),
                row: idx + 2,
            })?;
        if normalize_cell(Some(value)).is_empty() {
            warn!("Row {} of the restock report has a blank '{MERCHANT_SKU}'; skipping", idx + 2);
            continue;
        }
        skus.push(value.as_display());
    }
    Ok(skus)
}

/// Normalized SKUs that occur more than once, in first-seen order.
pub fn duplicate_skus(skus: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for sku in skus {
        let key = normalize_for_match(sku);
        if !seen.insert(key.clone()) && reported.insert(key.clone()) {
            duplicates.push(key);
        }
    }
    duplicates
}

/// Result of matching target SKUs against one source table.
#[derive(Debug, Clone)]
pub struct SkuMatches<'a> {
    pub source: SourceName,
    found: HashMap<String, &'a Row>,
    unmatched: Vec<String>,
}

impl<'a> SkuMatches<'a> {
    pub fn get(&self, sku: &str) -> Option<&'a Row> {
        self.found.get(&normalize_for_match(sku)).copied()
    }

    pub fn found(&self) -> &HashMap<String, &'a Row> {
        &self.found
    }

    /// Normalized targets without a matching row, in target order.
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

/// Finds, for each target SKU, the first row of `table` whose SKU-like column holds it.
///
/// With a `marketplace` filter, rows declaring a different non-empty `MARKETPLACE_ID`
/// are skipped; rows without that column are always kept.
pub fn match_rows<'a, S: AsRef<str>>(
    target_skus: &[S],
    table: &'a SourceTable,
    marketplace: Option<&str>,
) -> SkuMatches<'a> {
    let targets: Vec<String> = target_skus
        .iter()
        .map(|sku| normalize_for_match(sku.as_ref()))
        .collect();
    let mut pending: HashSet<&str> = targets.iter().map(String::as_str).collect();
    let wanted_marketplace = marketplace.map(normalize_for_match);
    let sku_columns = SkuColumns::discover(table);
    if sku_columns.is_empty() && !table.is_empty() {
        warn!("No SKU-like column found in {}", table.name);
    }
    debug!(
        "Matching {} SKU(s) against {} using column(s) {:?}",
        pending.len(),
        table.name,
        sku_columns.labels()
    );

    let mut found: HashMap<String, &'a Row> = HashMap::new();
    for row in table.rows() {
        if pending.is_empty() {
            break;
        }
        if let Some(wanted) = wanted_marketplace.as_deref() {
            let declared = match_key(find_column(row, MARKETPLACE_ID));
            if !declared.is_empty() && declared != wanted {
                continue;
            }
        }
        for value in sku_columns.values(row) {
            let key = match_key(Some(value));
            if pending.remove(key.as_str()) {
                found.insert(key, row);
                break;
            }
        }
    }

    let mut reported = HashSet::new();
    let unmatched = targets
        .iter()
        .filter(|sku| pending.contains(sku.as_str()) && reported.insert(sku.as_str()))
        .cloned()
        .collect();

    SkuMatches {
        source: table.name,
        found,
        unmatched,
    }
}

/// Matched rows for one SKU, one slot per source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedRow<'a> {
    pub restock: Option<&'a Row>,
    pub inventory: Option<&'a Row>,
    pub informed: Option<&'a Row>,
}

impl<'a> MatchedRow<'a> {
    pub fn row(&self, source: SourceName) -> Option<&'a Row> {
        match source {
            SourceName::RestockReport => self.restock,
            SourceName::InventoryFile => self.inventory,
            SourceName::InformedCsv => self.informed,
        }
    }

    fn slot(&mut self, source: SourceName) -> &mut Option<&'a Row> {
        match source {
            SourceName::RestockReport => &mut self.restock,
            SourceName::InventoryFile => &mut self.inventory,
            SourceName::InformedCsv => &mut self.informed,
        }
    }
}

/// Per-SKU matched rows across all three sources, in first-sight order.
#[derive(Debug, Default)]
pub struct MatchedRowSet<'a> {
    order: Vec<String>,
    entries: HashMap<String, MatchedRow<'a>>,
    unmatched: Vec<(SourceName, Vec<String>)>,
}

impl<'a> MatchedRowSet<'a> {
    /// Matches `targets` against each source in turn (restock, inventory, informed).
    /// The marketplace filter applies to the informed source only.
    pub fn build<S: AsRef<str>>(
        targets: &[S],
        restock: &'a SourceTable,
        inventory: &'a SourceTable,
        informed: &'a SourceTable,
        marketplace: Option<&str>,
    ) -> Self {
        let mut set = MatchedRowSet::default();
        set.absorb(targets, match_rows(targets, restock, None));
        set.absorb(targets, match_rows(targets, inventory, None));
        set.absorb(targets, match_rows(targets, informed, marketplace));
        set
    }

    /// Records the matches of one source. Entries are created on first sight of a SKU
    /// and filled in by later sources; insertion follows `targets` order.
    pub fn absorb<S: AsRef<str>>(&mut self, targets: &[S], matches: SkuMatches<'a>) {
        for target in targets {
            let key = normalize_for_match(target.as_ref());
            let Some(row) = matches.found.get(&key).copied() else {
                continue;
            };
            if !self.entries.contains_key(&key) {
                self.order.push(key.clone());
            }
            *self.entries.entry(key).or_default().slot(matches.source) = Some(row);
        }
        self.unmatched.push((matches.source, matches.unmatched));
    }

    pub fn get(&self, sku: &str) -> Option<&MatchedRow<'a>> {
        self.entries.get(&normalize_for_match(sku))
    }

    /// Entries in first-sight order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchedRow<'a>)> {
        self.order
            .iter()
            .filter_map(|sku| self.entries.get(sku).map(|entry| (sku.as_str(), entry)))
    }

    pub fn unmatched(&self, source: SourceName) -> &[String] {
        self.unmatched
            .iter()
            .find(|(name, _)| *name == source)
            .map(|(_, skus)| skus.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
