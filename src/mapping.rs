//! The output column catalogue and its `columns` listing command.
//!
//! Each entry names an output column, the source report it is copied from (if any),
//! the column to read there, and the processor and validator that apply to it.
//! Output column order is catalogue order.

use anyhow::Result;
use log::info;

use crate::{
    cli::ColumnsArgs,
    data::{CellValue, SourceName},
    processors::{self, Processor},
    table,
};

/// Describes the expected shape of a column value. Informational only.
pub type Validator = fn(&CellValue) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub source: Option<SourceName>,
    pub source_column: Option<&'static str>,
    pub processor: Option<Processor>,
    pub validator: Option<Validator>,
}

impl ColumnSpec {
    /// A column copied verbatim from `source`, under the same name.
    pub const fn copied(name: &'static str, source: SourceName) -> Self {
        ColumnSpec {
            name,
            source: Some(source),
            source_column: None,
            processor: None,
            validator: None,
        }
    }

    /// A column with no source, filled by its processor.
    pub const fn computed(name: &'static str, processor: Processor) -> Self {
        ColumnSpec {
            name,
            source: None,
            source_column: None,
            processor: Some(processor),
            validator: None,
        }
    }

    pub const fn from_column(mut self, source_column: &'static str) -> Self {
        self.source_column = Some(source_column);
        self
    }

    pub const fn processed(mut self, processor: Processor) -> Self {
        self.processor = Some(processor);
        self
    }

    pub const fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Column to read in the source row: the override, else the output name.
    pub fn resolved_source_column(&self) -> &'static str {
        self.source_column.unwrap_or(self.name)
    }
}

/// Immutable, ordered column catalogue.
#[derive(Debug, Clone)]
pub struct MappingSpec {
    columns: Vec<ColumnSpec>,
}

impl MappingSpec {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        MappingSpec { columns }
    }

    /// The reconciliation catalogue: restock identity and velocity, inventory supplier
    /// data, and informed pricing.
    pub fn standard() -> Self {
        use SourceName::{InformedCsv, InventoryFile, RestockReport};

        let number = |spec: ColumnSpec| {
            spec.processed(processors::NUMBER_STYLE)
                .validated(validate_number)
        };
        MappingSpec::new(vec![
            ColumnSpec::copied("Merchant SKU", RestockReport),
            ColumnSpec::copied("ASIN", RestockReport),
            ColumnSpec::copied("Product Name", RestockReport),
            ColumnSpec::copied("Part Number", InventoryFile),
            ColumnSpec::copied("Primary Supplier", InventoryFile),
            ColumnSpec::copied("Classification", InventoryFile),
            number(ColumnSpec::copied(processors::UNITS_SOLD_30_DAYS, RestockReport)),
            ColumnSpec::copied("CURRENT_VELOCITY", InformedCsv),
            number(ColumnSpec::copied(processors::TOTAL_UNITS, RestockReport)),
            ColumnSpec::computed("Days on Hand", processors::DAYS_ON_HAND)
                .validated(validate_number),
            number(ColumnSpec::copied("Quantity Available", InventoryFile)),
            number(ColumnSpec::copied("COST", InformedCsv)),
            number(ColumnSpec::copied(processors::MIN_PRICE, InformedCsv)),
            number(ColumnSpec::copied("CURRENT_PRICE", InformedCsv)),
            ColumnSpec::copied(processors::BUY_BOX_PRICE, InformedCsv)
                .processed(processors::BUY_BOX_COLOR)
                .validated(validate_number),
            number(ColumnSpec::copied(processors::MAX_PRICE, InformedCsv)),
        ])
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Accepts empty cells, numbers, and text that parses as a float.
pub fn validate_number(value: &CellValue) -> bool {
    match value {
        CellValue::Empty | CellValue::Number(_) => true,
        CellValue::Text(s) => s.is_empty() || s.trim().parse::<f64>().is_ok(),
    }
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let spec = MappingSpec::standard();
    let headers = ["#", "column", "source", "source column", "processor", "validator"]
        .map(str::to_string)
        .to_vec();
    let rows = spec
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| args.source.is_none() || column.source == args.source)
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.to_string(),
                column
                    .source
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(computed)".to_string()),
                column
                    .source
                    .map(|_| column.resolved_source_column().to_string())
                    .unwrap_or_default(),
                column.processor.map(|p| p.name).unwrap_or_default().to_string(),
                if column.validator.is_some() {
                    "number".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Listed {} of {} catalogue column(s)", rows.len(), spec.len());
    Ok(())
}
