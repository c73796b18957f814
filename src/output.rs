//! Writers for the processed output table.
//!
//! Workbooks carry the processors' hints verbatim (two-decimal number format,
//! solid fill). CSV has no styling, so numbers are rendered with their display
//! format and fills are dropped.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use encoding_rs::Encoding;
use log::debug;
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook};

use crate::{
    data::CellValue,
    io_utils,
    processors::{ProcessedCell, ProcessedRow},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => OutputFormat::Xlsx,
            _ => OutputFormat::Csv,
        }
    }
}

/// `output_<YYYY-MM-DD_HH-MM>.xlsx` in the working directory.
pub fn default_output_name(now: DateTime<Local>) -> String {
    format!("output_{}.xlsx", now.format("%Y-%m-%d_%H-%M"))
}

pub fn write_xlsx(path: &Path, headers: &[String], rows: &[ProcessedRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header)
            .with_context(|| format!("Writing header '{header}'"))?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.cells.iter().enumerate() {
            let col = col as u16;
            let format = cell_format(cell);
            let written = match (&cell.value, &format) {
                (CellValue::Number(n), Some(format)) => {
                    worksheet.write_number_with_format(row_num, col, *n, format)
                }
                (CellValue::Number(n), None) => worksheet.write_number(row_num, col, *n),
                (value, Some(format)) => {
                    worksheet.write_string_with_format(row_num, col, value.as_display(), format)
                }
                (CellValue::Empty, None) => continue,
                (value, None) => worksheet.write_string(row_num, col, value.as_display()),
            };
            written.with_context(|| format!("Writing cell ({row_num}, {col}) for SKU '{}'", row.sku))?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("Saving workbook {path:?}"))?;
    Ok(())
}

fn cell_format(cell: &ProcessedCell) -> Option<Format> {
    if cell.display_format.is_none() && cell.fill.is_none() {
        return None;
    }
    let mut format = Format::new();
    if let Some(display) = cell.display_format {
        format = format.set_num_format(display.excel_code());
    }
    if let Some(fill) = cell.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill.rgb()));
    }
    Some(format)
}

pub fn write_csv(
    path: Option<&Path>,
    headers: &[String],
    rows: &[ProcessedRow],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter, encoding)?;
    writer
        .write_record(headers)
        .context("Writing output headers")?;
    let mut dropped_fills = 0usize;
    for row in rows {
        dropped_fills += row.cells.iter().filter(|c| c.fill.is_some()).count();
        writer
            .write_record(row.display_values())
            .with_context(|| format!("Writing output row for SKU '{}'", row.sku))?;
    }
    writer.flush().context("Flushing output writer")?;
    if dropped_fills > 0 {
        debug!("CSV output cannot carry fills; dropped {dropped_fills} cell fill(s)");
    }
    Ok(())
}
