//! End-to-end reconciliation run.
//!
//! Loads all three sources, matches every restock SKU across them, merges and
//! processes one output row per SKU, and only then writes the output. A fatal error
//! at any step leaves no output file behind.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    cli::ReconcileArgs,
    data::{SourceName, SourceTable},
    io_utils,
    mapping::MappingSpec,
    matcher::{self, MatchedRowSet},
    merge::{MergeMode, merge},
    output::{self, OutputFormat},
    processors::{ProcessedRow, process_row},
    sources::{self, LoadOptions},
    table,
};

/// The three loaded sources of one run.
#[derive(Debug)]
pub struct Sources {
    pub restock: SourceTable,
    pub inventory: SourceTable,
    pub informed: SourceTable,
}

impl Sources {
    pub fn get(&self, name: SourceName) -> &SourceTable {
        match name {
            SourceName::RestockReport => &self.restock,
            SourceName::InventoryFile => &self.inventory,
            SourceName::InformedCsv => &self.informed,
        }
    }
}

/// Tunables of the in-memory pipeline.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub marketplace: Option<String>,
    pub merge_mode: MergeMode,
}

/// Processed rows plus what the run learned about its inputs.
#[derive(Debug)]
pub struct Reconciliation {
    pub headers: Vec<String>,
    pub rows: Vec<ProcessedRow>,
    pub matched: Vec<(SourceName, usize)>,
    pub unmatched: Vec<(SourceName, Vec<String>)>,
    pub duplicate_restock_skus: Vec<String>,
    pub validation_warnings: usize,
}

/// Runs matching, merge, and processing over already-loaded sources.
pub fn reconcile(
    sources: &Sources,
    spec: &MappingSpec,
    options: &RunOptions,
) -> Result<Reconciliation> {
    let targets = matcher::extract_target_skus(sources.restock.rows())
        .context("Extracting merchant SKUs from the restock report")?;
    let duplicate_restock_skus = matcher::duplicate_skus(&targets);
    for sku in &duplicate_restock_skus {
        warn!("SKU '{sku}' appears more than once in the restock report; keeping the first row");
    }
    info!("Matching {} SKU(s) across sources", targets.len());

    let matched = MatchedRowSet::build(
        &targets,
        &sources.restock,
        &sources.inventory,
        &sources.informed,
        options.marketplace.as_deref(),
    );

    let mut matched_counts = Vec::with_capacity(SourceName::ALL.len());
    let mut unmatched = Vec::with_capacity(SourceName::ALL.len());
    for source in SourceName::ALL {
        let missing = matched.unmatched(source).to_vec();
        let found = matched.iter().filter(|(_, row)| row.row(source).is_some()).count();
        info!("{source}: {found} SKU(s) matched, {} unmatched", missing.len());
        if !missing.is_empty() {
            debug!("{source} unmatched: {}", missing.iter().join(", "));
        }
        matched_counts.push((source, found));
        unmatched.push((source, missing));
    }

    let mut rows = Vec::with_capacity(matched.len());
    let mut validation_warnings = 0usize;
    for (sku, matched_row) in matched.iter() {
        let merged = merge(sku, matched_row, spec, options.merge_mode)?;
        let processed = process_row(sku, &merged, spec)
            .with_context(|| format!("Processing output row for SKU '{sku}'"))?;
        for (column, cell) in spec.columns().iter().zip(&processed.cells) {
            let Some(validator) = column.validator else {
                continue;
            };
            if !validator(&cell.value) {
                validation_warnings += 1;
                warn!(
                    "SKU '{sku}': column '{}' has unexpected value '{}'",
                    column.name, cell.value
                );
            }
        }
        rows.push(processed);
    }
    info!("Processed {} output row(s)", rows.len());

    Ok(Reconciliation {
        headers: spec.headers(),
        rows,
        matched: matched_counts,
        unmatched,
        duplicate_restock_skus,
        validation_warnings,
    })
}

fn resolve_source(
    explicit: Option<&PathBuf>,
    files_dir: &Path,
    name: SourceName,
) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => sources::discover(files_dir, name.as_str())
            .with_context(|| format!("Locating the {name} source")),
    }
}

#[derive(Debug, Serialize)]
struct SourceSummary {
    name: SourceName,
    path: PathBuf,
    rows: usize,
    matched: usize,
    unmatched: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    generated_at: String,
    output: String,
    marketplace: Option<String>,
    output_rows: usize,
    sources: Vec<SourceSummary>,
    duplicate_restock_skus: Vec<String>,
    validation_warnings: usize,
}

pub fn execute(args: &ReconcileArgs) -> Result<()> {
    let started = Local::now();
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let load_options = LoadOptions {
        delimiter: args.delimiter,
        encoding: input_encoding,
    };

    let mut paths = Vec::with_capacity(SourceName::ALL.len());
    for (name, explicit) in [
        (SourceName::RestockReport, args.restock.as_ref()),
        (SourceName::InventoryFile, args.inventory.as_ref()),
        (SourceName::InformedCsv, args.informed.as_ref()),
    ] {
        paths.push(resolve_source(explicit, &args.files_dir, name)?);
    }
    let sources = Sources {
        restock: sources::load_table(&paths[0], SourceName::RestockReport, load_options)?,
        inventory: sources::load_table(&paths[1], SourceName::InventoryFile, load_options)?,
        informed: sources::load_table(&paths[2], SourceName::InformedCsv, load_options)?,
    };

    let spec = MappingSpec::standard();
    let options = RunOptions {
        marketplace: args.marketplace.clone(),
        merge_mode: if args.strict {
            MergeMode::Strict
        } else {
            MergeMode::Tolerant
        },
    };
    if let Some(marketplace) = &options.marketplace {
        info!("Restricting informed prices to marketplace '{marketplace}'");
    }
    let result = reconcile(&sources, &spec, &options)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output::default_output_name(started)));
    match OutputFormat::for_path(&output_path) {
        OutputFormat::Xlsx => output::write_xlsx(&output_path, &result.headers, &result.rows)?,
        OutputFormat::Csv => {
            let delimiter = io_utils::resolve_output_delimiter(
                Some(output_path.as_path()).filter(|p| !io_utils::is_dash(p)),
                args.output_delimiter,
            );
            output::write_csv(
                Some(output_path.as_path()),
                &result.headers,
                &result.rows,
                delimiter,
                output_encoding,
            )?
        }
    }
    let destination = if io_utils::is_dash(&output_path) {
        "stdout".to_string()
    } else {
        output_path.display().to_string()
    };
    info!("Saved {} row(s) to {destination}", result.rows.len());

    if args.table {
        let rendered: Vec<Vec<String>> = result.rows.iter().map(ProcessedRow::display_values).collect();
        table::print_table(&result.headers, &rendered);
    }

    if let Some(report_path) = &args.report {
        let report = RunReport {
            generated_at: started.to_rfc3339(),
            output: destination,
            marketplace: options.marketplace.clone(),
            output_rows: result.rows.len(),
            sources: SourceName::ALL
                .iter()
                .zip(&paths)
                .map(|(name, path)| SourceSummary {
                    name: *name,
                    path: path.clone(),
                    rows: sources.get(*name).len(),
                    matched: lookup(&result.matched, *name).copied().unwrap_or_default(),
                    unmatched: lookup(&result.unmatched, *name).cloned().unwrap_or_default(),
                })
                .collect(),
            duplicate_restock_skus: result.duplicate_restock_skus.clone(),
            validation_warnings: result.validation_warnings,
        };
        let file = File::create(report_path)
            .with_context(|| format!("Creating report file {report_path:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("Writing report to {report_path:?}"))?;
        info!("Run report written to {report_path:?}");
    }
    Ok(())
}

fn lookup<T>(pairs: &[(SourceName, T)], name: SourceName) -> Option<&T> {
    pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
}
