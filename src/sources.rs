//! Locating and loading the source reports.
//!
//! Reports are dropped into a working directory under whatever name the exporting
//! tool chose ("Restock_Report_2024-05-01.txt", "informed-export.csv"), so each
//! source is located by the closest file name rather than an exact one. Delimited
//! text and Excel workbooks both load into the same [`SourceTable`] shape.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::Encoding;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    data::{CellValue, SourceName, SourceTable},
    error::ReconcileError,
    io_utils,
    normalize::{clean_value, normalize},
};

/// Minimum similarity ratio for a file name to count as a match.
pub const NAME_CUTOFF: f32 = 0.6;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Options shared by every source load.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Finds the file under `dir` whose name is closest to `name`.
///
/// Directories are visited depth-first in name order; the first directory holding
/// a close enough file name wins.
pub fn discover(dir: &Path, name: &str) -> Result<PathBuf, ReconcileError> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut files: HashMap<PathBuf, Vec<String>> = HashMap::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if entry.file_type().is_dir() {
            dirs.push(entry.path().to_path_buf());
        } else if let (Some(parent), Some(file_name)) =
            (entry.path().parent(), entry.file_name().to_str())
        {
            files
                .entry(parent.to_path_buf())
                .or_default()
                .push(file_name.to_string());
        }
    }

    for candidate_dir in &dirs {
        let Some(names) = files.get(candidate_dir) else {
            continue;
        };
        let candidates: Vec<&str> = names.iter().map(String::as_str).collect();
        if let Some(best) = similar::get_close_matches(name, &candidates, 1, NAME_CUTOFF).first()
        {
            let path = candidate_dir.join(best);
            debug!("Resolved '{name}' to {path:?}");
            return Ok(path);
        }
    }

    Err(ReconcileError::SourceNotFound {
        name: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Loads a source report, choosing the reader by file extension.
pub fn load_table(path: &Path, name: SourceName, options: LoadOptions) -> Result<SourceTable> {
    info!("Reading {name} from {path:?}");
    let ext = extension_of(path).unwrap_or_default();
    let table = if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        load_workbook(path, name)?
    } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        load_delimited(path, name, options)?
    } else {
        return Err(ReconcileError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
        .into());
    };
    info!(
        "Loaded {} row(s) across {} column(s) from {name}",
        table.len(),
        table.headers().len()
    );
    Ok(table)
}

fn load_delimited(path: &Path, name: SourceName, options: LoadOptions) -> Result<SourceTable> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, options.encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?
        .iter()
        .map(|h| normalize(h))
        .collect();
    let mut table = SourceTable::new(name, headers);

    let mut skipped = 0usize;
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", idx + 2))?;
        match io_utils::decode_record(&record, options.encoding) {
            Ok(fields) => table.push(
                fields
                    .iter()
                    .map(|field| CellValue::text(clean_value(field)))
                    .collect(),
            ),
            Err(err) => {
                skipped += 1;
                warn!("Skipping row {} of {path:?}: {err}", idx + 2);
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} undecodable row(s) in {name}");
    }
    Ok(table)
}

fn load_workbook(path: &Path, name: SourceName) -> Result<SourceTable> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(SourceTable::new(name, Vec::new()));
    };
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Reading sheet '{sheet}' of {path:?}"))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| normalize(&cell_value(cell).as_display()))
                .collect()
        })
        .unwrap_or_default();
    let mut table = SourceTable::new(name, headers);
    for row in rows {
        table.push(row.iter().map(cell_value).collect());
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(clean_value(s)),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}
