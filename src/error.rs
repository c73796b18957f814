use std::path::PathBuf;

use thiserror::Error;

use crate::data::SourceName;

/// Errors raised by the matching, merge, and processing core.
///
/// Matching-level misses (an unmatched SKU, a mapped column absent from a matched row)
/// are absorbed into empty output and never show up here, except under strict merge.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The restock source lacks the mandatory key column on some row.
    #[error("row {row} of the restock report has no '{column}' column")]
    MissingKeyColumn { column: String, row: usize },

    /// Strict merge only: a matched source row does not carry a mapped column.
    #[error("SKU '{sku}': column '{column}' is missing from the matched {source_name} row")]
    MissingMappedColumn {
        sku: String,
        source_name: SourceName,
        column: String,
    },

    /// A processor was handed a present value that is not a number.
    #[error("column '{column}' holds non-numeric value '{value}'")]
    NumericParse { column: String, value: String },

    #[error("no file resembling '{name}' found under {dir:?}")]
    SourceNotFound { name: String, dir: PathBuf },

    #[error("unsupported source file format: {path:?}")]
    UnsupportedFormat { path: PathBuf },
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
