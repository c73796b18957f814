use std::{fmt, sync::Arc};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single cell as loaded from a source report or produced by a processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Spreadsheet truthiness: empty text and zero are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One record: shared header labels plus one value per label.
///
/// All rows of a table share the same `Arc` of headers, so cloning a row never
/// copies label text.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<CellValue>,
}

impl Row {
    /// Builds a row, padding missing trailing values with [`CellValue::Empty`] and
    /// dropping values beyond the header count.
    pub fn new(headers: Arc<[String]>, mut values: Vec<CellValue>) -> Self {
        values.resize(headers.len(), CellValue::Empty);
        Row { headers, values }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let (headers, values): (Vec<String>, Vec<CellValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Row {
            headers: headers.into(),
            values,
        }
    }

    pub fn headers(&self) -> &Arc<[String]> {
        &self.headers
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Exact, unnormalized label lookup.
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.headers
            .iter()
            .position(|h| h == label)
            .map(|idx| &self.values[idx])
    }

    pub fn set(&mut self, label: &str, value: CellValue) -> bool {
        match self.headers.iter().position(|h| h == label) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Identity of a source report, used as the lookup key in the column catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SourceName {
    RestockReport,
    InventoryFile,
    InformedCsv,
}

impl SourceName {
    pub const ALL: [SourceName; 3] = [
        SourceName::RestockReport,
        SourceName::InventoryFile,
        SourceName::InformedCsv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceName::RestockReport => "restock_report",
            SourceName::InventoryFile => "inventory_file",
            SourceName::InformedCsv => "informed_csv",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every row loaded from one source report, in file order.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: SourceName,
    headers: Arc<[String]>,
    rows: Vec<Row>,
}

impl SourceTable {
    pub fn new(name: SourceName, headers: Vec<String>) -> Self {
        SourceTable {
            name,
            headers: headers.into(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from string records, the way tests and small fixtures do.
    pub fn from_records(name: SourceName, headers: &[&str], records: &[&[&str]]) -> Self {
        let mut table = SourceTable::new(name, headers.iter().map(|h| h.to_string()).collect());
        for record in records {
            table.push(record.iter().map(|v| CellValue::text(*v)).collect());
        }
        table
    }

    pub fn push(&mut self, values: Vec<CellValue>) {
        self.rows.push(Row::new(Arc::clone(&self.headers), values));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
