use std::sync::Arc;

use crate::{
    data::{CellValue, Row},
    error::{ReconcileError, ReconcileResult},
    mapping::MappingSpec,
    matcher::MatchedRow,
};

/// How a mapped column absent from a present source row is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Leave the output cell empty.
    #[default]
    Tolerant,
    /// Fail with [`ReconcileError::MissingMappedColumn`].
    Strict,
}

/// Builds the output row for one SKU from its matched source rows.
///
/// Every catalogue column starts empty; sourced columns are copied from the matched
/// row of their source. Computed columns stay empty until processed. An unmatched
/// source is never an error, in either mode.
pub fn merge(
    sku: &str,
    matched: &MatchedRow<'_>,
    spec: &MappingSpec,
    mode: MergeMode,
) -> ReconcileResult<Row> {
    let headers: Arc<[String]> = spec.headers().into();
    let mut values = vec![CellValue::Empty; headers.len()];

    for (slot, column) in values.iter_mut().zip(spec.columns()) {
        let Some(source) = column.source else {
            continue;
        };
        let Some(source_row) = matched.row(source) else {
            continue;
        };
        let source_column = column.resolved_source_column();
        match source_row.get(source_column) {
            Some(value) => *slot = value.clone(),
            None if mode == MergeMode::Strict => {
                return Err(ReconcileError::MissingMappedColumn {
                    sku: sku.to_string(),
                    source_name: source,
                    column: source_column.to_string(),
                });
            }
            None => {}
        }
    }

    Ok(Row::new(headers, values))
}
