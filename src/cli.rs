use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::SourceName;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile restock, inventory, and pricing reports by merchant SKU",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Match every restock SKU across the three reports and write the merged table
    Reconcile(ReconcileArgs),
    /// List the output column catalogue
    Columns(ColumnsArgs),
    /// Preview the first few rows of a source report in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Directory searched for source reports not given explicitly
    #[arg(long = "files-dir", default_value = "files")]
    pub files_dir: PathBuf,
    /// Restock report (.txt, .tsv, .csv, or .xlsx)
    #[arg(long)]
    pub restock: Option<PathBuf>,
    /// Inventory file
    #[arg(long)]
    pub inventory: Option<PathBuf>,
    /// Informed pricing export
    #[arg(long)]
    pub informed: Option<PathBuf>,
    /// Output file; `.xlsx` writes a workbook, anything else CSV (`-` for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Only use informed rows for this marketplace ID
    #[arg(long)]
    pub marketplace: Option<String>,
    /// Fail when a matched row lacks a mapped column instead of leaving it empty
    #[arg(long)]
    pub strict: bool,
    /// Delimiter for delimited inputs (defaults by extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter for CSV output
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of delimited inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of CSV output (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Write a JSON run report (match counts, unmatched and duplicate SKUs)
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Also print the processed output as a table to stdout
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Only list columns copied from this source
    #[arg(long, value_enum)]
    pub source: Option<SourceName>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Source to locate under --files-dir
    #[arg(long, value_enum, required_unless_present = "input")]
    pub source: Option<SourceName>,
    /// Explicit report path (overrides --source discovery)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Directory searched when --source is used
    #[arg(long = "files-dir", default_value = "files")]
    pub files_dir: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Delimiter for delimited inputs (defaults by extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "pipe" | "|" => Ok(b'|'),
        "semicolon" | ";" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
