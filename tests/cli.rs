mod common;

use std::{fs, path::Path};

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::{prelude::*, str::contains};

fn bin() -> Command {
    Command::cargo_bin("restock-recon").expect("binary exists")
}

fn read_output(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open output");
    reader
        .records()
        .map(|record| {
            record
                .expect("output record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

fn column<'a>(rows: &'a [Vec<String>], row: usize, name: &str) -> &'a str {
    let idx = rows[0]
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    &rows[row][idx]
}

#[test]
fn reconcile_writes_merged_csv_in_restock_order() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.csv");

    bin()
        .current_dir(workspace.path())
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let rows = read_output(&output);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].len(), 16);
    assert_eq!(rows[0][0], "Merchant SKU");
    assert_eq!(rows[0][15], "MAX_PRICE");

    assert_eq!(column(&rows, 1, "Merchant SKU"), "AB-100");
    assert_eq!(column(&rows, 1, "Part Number"), "PN-1");
    assert_eq!(column(&rows, 1, "Units Sold Last 30 Days"), "10.00");
    assert_eq!(column(&rows, 1, "Days on Hand"), "300.00");
    assert_eq!(column(&rows, 1, "Quantity Available"), "12.00");
    assert_eq!(column(&rows, 1, "COST"), "4.00");
    assert_eq!(column(&rows, 1, "BUY_BOX_PRICE"), "15");
    assert_eq!(column(&rows, 1, "MAX_PRICE"), "20.00");

    assert_eq!(column(&rows, 2, "Merchant SKU"), "cd-200");
    assert_eq!(column(&rows, 2, "Days on Hand"), "1.00");
    assert_eq!(column(&rows, 2, "Primary Supplier"), "Globex");

    assert_eq!(column(&rows, 3, "Merchant SKU"), "EF-300");
    assert_eq!(column(&rows, 3, "Days on Hand"), "Infinity");
    assert_eq!(column(&rows, 3, "Part Number"), "");
    assert_eq!(column(&rows, 3, "Quantity Available"), "");
    assert_eq!(column(&rows, 3, "BUY_BOX_PRICE"), "");
}

#[test]
fn reconcile_quotes_every_csv_field() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.csv");

    bin()
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output).expect("read output");
    assert!(text.starts_with("\"Merchant SKU\",\"ASIN\""));
}

#[test]
fn reconcile_filters_informed_rows_by_marketplace() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.csv");

    bin()
        .args(["reconcile", "--marketplace", "1", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let rows = read_output(&output);
    assert_eq!(column(&rows, 1, "BUY_BOX_PRICE"), "25");
    assert_eq!(column(&rows, 1, "CURRENT_PRICE"), "26.00");
    assert_eq!(column(&rows, 2, "BUY_BOX_PRICE"), "5");
}

#[test]
fn reconcile_accepts_explicit_source_paths() {
    let workspace = TestWorkspace::new();
    let restock = workspace.write("in/restock.tsv", common::RESTOCK_TXT);
    let inventory = workspace.write("in/stock.csv", common::INVENTORY_CSV);
    let informed = workspace.write("in/prices.csv", common::INFORMED_CSV);
    let output = workspace.path().join("out.csv");

    bin()
        .arg("reconcile")
        .arg("--restock")
        .arg(&restock)
        .arg("--inventory")
        .arg(&inventory)
        .arg("--informed")
        .arg(&informed)
        .arg("--files-dir")
        .arg(workspace.path().join("missing"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(read_output(&output).len(), 4);
}

#[test]
fn reconcile_without_merchant_sku_fails_and_writes_nothing() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    workspace.write(
        "files/restock_report_may.txt",
        "SKU\tTotal Units\nAB-100\t100\n",
    );
    let output = workspace.path().join("out.csv");

    bin()
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("Merchant SKU"));

    assert!(!output.exists());
}

#[test]
fn reconcile_reports_missing_source_directory() {
    let workspace = TestWorkspace::new();
    bin()
        .current_dir(workspace.path())
        .arg("reconcile")
        .assert()
        .failure()
        .stderr(contains("restock_report"));
}

#[test]
fn reconcile_strict_fails_on_missing_mapped_column() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    workspace.write(
        "files/informed_csv_export.csv",
        "SKU,BUY_BOX_PRICE\nAB-100,15\n",
    );
    let output = workspace.path().join("out.csv");

    bin()
        .args(["reconcile", "--strict", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("CURRENT_VELOCITY"));
    assert!(!output.exists());

    bin()
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    let rows = read_output(&output);
    assert_eq!(column(&rows, 1, "COST"), "");
}

#[test]
fn reconcile_writes_json_report() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.csv");
    let report = workspace.path().join("run.json");

    bin()
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert_eq!(json["output_rows"], 3);
    let sources = json["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["name"], "restock_report");
    assert_eq!(sources[1]["name"], "inventory_file");
    assert_eq!(sources[1]["matched"], 2);
    assert_eq!(sources[1]["unmatched"], serde_json::json!(["ef-300"]));
    assert_eq!(json["duplicate_restock_skus"], serde_json::json!([]));
}

#[test]
fn reconcile_writes_xlsx_workbook() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.xlsx");

    bin()
        .args(["reconcile", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let bytes = fs::read(&output).expect("read workbook");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn reconcile_defaults_to_timestamped_workbook() {
    let workspace = TestWorkspace::new();
    workspace.write_standard_reports();

    bin()
        .current_dir(workspace.path())
        .arg("reconcile")
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(workspace.path())
        .expect("list workspace")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("output_") && name.ends_with(".xlsx"))
        .collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn reconcile_table_prints_processed_rows() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();
    let output = workspace.path().join("out.csv");

    bin()
        .args(["reconcile", "--table", "--files-dir"])
        .arg(&files)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Days on Hand"))
        .stdout(contains("300.00"))
        .stdout(contains("Infinity"));
}

#[test]
fn columns_lists_catalogue() {
    bin()
        .arg("columns")
        .assert()
        .success()
        .stdout(contains("Merchant SKU"))
        .stdout(contains("days-on-hand"))
        .stdout(contains("buy-box color"))
        .stdout(contains("(computed)"));
}

#[test]
fn columns_filters_by_source() {
    bin()
        .args(["columns", "--source", "inventory_file"])
        .assert()
        .success()
        .stdout(contains("Part Number"))
        .stdout(contains("BUY_BOX_PRICE").not());
}

#[test]
fn preview_discovers_and_prints_rows() {
    let workspace = TestWorkspace::new();
    let files = workspace.write_standard_reports();

    bin()
        .args(["preview", "--source", "inventory_file", "--rows", "1", "--files-dir"])
        .arg(&files)
        .assert()
        .success()
        .stdout(contains("Part Number"))
        .stdout(contains("PN-1"))
        .stdout(contains("PN-2").not());
}

#[test]
fn preview_reads_explicit_input() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("restock.txt", common::RESTOCK_TXT);

    bin()
        .args(["preview", "-i"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Green Widget"));
}
