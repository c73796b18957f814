//! Derived values and presentation hints for merged output rows.
//!
//! A processor sees the fully merged row (read-only) and the current value of the
//! cell it owns, and returns the value to emit together with optional display hints.
//! Processors never touch a concrete spreadsheet type; the writer applies the hints.

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::{
    columns::find_column,
    data::{CellValue, Row},
    error::{ReconcileError, ReconcileResult},
    mapping::MappingSpec,
};

pub const TOTAL_UNITS: &str = "Total Units";
pub const UNITS_SOLD_30_DAYS: &str = "Units Sold Last 30 Days";
pub const BUY_BOX_PRICE: &str = "BUY_BOX_PRICE";
pub const MIN_PRICE: &str = "MIN_PRICE";
pub const MAX_PRICE: &str = "MAX_PRICE";

/// Literal emitted when stock exists but nothing sold in the window.
pub const INFINITY: &str = "Infinity";

pub type ProcessorFn = fn(&Row, &str, &CellValue) -> ReconcileResult<ProcessedCell>;

/// A processor function together with the name it is listed under.
#[derive(Clone, Copy)]
pub struct Processor {
    pub name: &'static str,
    pub apply: ProcessorFn,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Processor").field(&self.name).finish()
    }
}

pub const DAYS_ON_HAND: Processor = Processor {
    name: "days-on-hand",
    apply: days_on_hand,
};
pub const BUY_BOX_COLOR: Processor = Processor {
    name: "buy-box color",
    apply: buy_box_color,
};
pub const NUMBER_STYLE: Processor = Processor {
    name: "numeric style",
    apply: number_style,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayFormat {
    /// Two fixed decimals (`0.00`).
    TwoDecimals,
}

impl DisplayFormat {
    pub fn excel_code(self) -> &'static str {
        match self {
            DisplayFormat::TwoDecimals => "0.00",
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            DisplayFormat::TwoDecimals => format!("{value:.2}"),
        }
    }
}

/// Solid fill palette for price-band classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillColor {
    Green,
    Red,
    Orange,
}

impl FillColor {
    pub fn rgb(self) -> u32 {
        match self {
            FillColor::Green => 0x00FF00,
            FillColor::Red => 0xFF0000,
            FillColor::Orange => 0xFFA500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCell {
    pub value: CellValue,
    pub display_format: Option<DisplayFormat>,
    pub fill: Option<FillColor>,
}

impl ProcessedCell {
    pub fn plain(value: CellValue) -> Self {
        ProcessedCell {
            value,
            display_format: None,
            fill: None,
        }
    }

    pub fn two_decimals(value: CellValue) -> Self {
        ProcessedCell {
            value,
            display_format: Some(DisplayFormat::TwoDecimals),
            fill: None,
        }
    }
}

/// One output row after every processor has run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub sku: String,
    pub cells: Vec<ProcessedCell>,
}

impl ProcessedRow {
    pub fn display_values(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match (&cell.value, cell.display_format) {
                (CellValue::Number(n), Some(format)) => format.render(*n),
                (value, _) => value.as_display(),
            })
            .collect()
    }
}

/// Runs the processor of every catalogue column against the merged row.
///
/// All processors read the same merged snapshot, so a derived column never observes
/// another processor's output.
pub fn process_row(sku: &str, merged: &Row, spec: &MappingSpec) -> ReconcileResult<ProcessedRow> {
    let cells = spec
        .columns()
        .iter()
        .map(|column| {
            let current = merged.get(column.name).cloned().unwrap_or_default();
            match column.processor {
                Some(processor) => (processor.apply)(merged, column.name, &current),
                None => Ok(ProcessedCell::plain(current)),
            }
        })
        .collect::<ReconcileResult<Vec<_>>>()?;
    trace!("Processed row for SKU '{sku}'");
    Ok(ProcessedRow {
        sku: sku.to_string(),
        cells,
    })
}

/// Parses a present cell as a float. Text is trimmed first.
pub fn parse_number(column: &str, value: &CellValue) -> ReconcileResult<f64> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ReconcileError::NumericParse {
                column: column.to_string(),
                value: s.clone(),
            }),
        CellValue::Empty => Err(ReconcileError::NumericParse {
            column: column.to_string(),
            value: String::new(),
        }),
    }
}

fn present<'a>(row: &'a Row, column: &str) -> Option<&'a CellValue> {
    find_column(row, column).filter(|value| !value.is_empty())
}

fn truthy<'a>(row: &'a Row, column: &str) -> Option<&'a CellValue> {
    find_column(row, column).filter(|value| value.is_truthy())
}

/// Days of cover: `(total units / units sold in 30 days) * 30`.
///
/// Missing inputs give an empty cell, zero stock with zero sales counts as one day,
/// and stock with zero sales gives `Infinity`.
pub fn days_on_hand(row: &Row, _column: &str, _current: &CellValue) -> ReconcileResult<ProcessedCell> {
    let (Some(total), Some(sold)) = (present(row, TOTAL_UNITS), present(row, UNITS_SOLD_30_DAYS))
    else {
        return Ok(ProcessedCell::two_decimals(CellValue::Empty));
    };
    let total = parse_number(TOTAL_UNITS, total)?;
    let sold = parse_number(UNITS_SOLD_30_DAYS, sold)?;

    let value = if total == 0.0 && sold == 0.0 {
        CellValue::Number(1.0)
    } else if sold == 0.0 {
        CellValue::Text(INFINITY.to_string())
    } else {
        CellValue::Number((total / sold) * 30.0)
    };
    Ok(ProcessedCell::two_decimals(value))
}

/// Price band of the buy box relative to the min/max repricing bounds.
pub fn classify_buy_box(min: f64, buy_box: f64, max: f64) -> FillColor {
    if min < buy_box && buy_box < max {
        FillColor::Green
    } else if min >= buy_box {
        FillColor::Red
    } else {
        FillColor::Orange
    }
}

/// Colors the cell by [`classify_buy_box()`]. Leaves it untouched when any of the
/// three prices is missing.
pub fn buy_box_color(row: &Row, _column: &str, current: &CellValue) -> ReconcileResult<ProcessedCell> {
    let (Some(buy_box), Some(min), Some(max)) = (
        truthy(row, BUY_BOX_PRICE),
        truthy(row, MIN_PRICE),
        truthy(row, MAX_PRICE),
    ) else {
        return Ok(ProcessedCell::plain(current.clone()));
    };
    let buy_box = parse_number(BUY_BOX_PRICE, buy_box)?;
    let min = parse_number(MIN_PRICE, min)?;
    let max = parse_number(MAX_PRICE, max)?;

    Ok(ProcessedCell {
        value: current.clone(),
        display_format: Some(DisplayFormat::TwoDecimals),
        fill: Some(classify_buy_box(min, buy_box, max)),
    })
}

/// Coerces a truthy value to a number; always formats with two decimals.
pub fn number_style(_row: &Row, column: &str, current: &CellValue) -> ReconcileResult<ProcessedCell> {
    let value = if current.is_truthy() {
        CellValue::Number(parse_number(column, current)?)
    } else {
        current.clone()
    };
    Ok(ProcessedCell::two_decimals(value))
}
