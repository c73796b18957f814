#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const RESTOCK_TXT: &str = "Merchant SKU\tASIN\tProduct Name\tUnits Sold Last 30 Days\tTotal Units\n\
AB-100\tB000000001\tBlue Widget\t10\t100\n\
cd-200\tB000000002\tRed Widget\t0\t0\n\
EF-300\tB000000003\tGreen Widget\t0\t5\n";

pub const INVENTORY_CSV: &str = "SKU#,Part Number,Primary Supplier,Classification,Quantity Available\n\
ab-100 ,PN-1,Acme,A,12\n\
CD-200,PN-2,Globex,B,0\n";

pub const INFORMED_CSV: &str = "SKU,MARKETPLACE_ID,CURRENT_VELOCITY,COST,MIN_PRICE,CURRENT_PRICE,BUY_BOX_PRICE,MAX_PRICE\n\
AB-100,2,1.5,4,10,16,15,20\n\
AB-100,1,1.1,4,10,26,25,20\n\
cd-200,1,0.2,3,10,9,5,20\n";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace (creating parent directories).
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Drops the three standard reports into `files/` under report-style names.
    pub fn write_standard_reports(&self) -> PathBuf {
        self.write("files/restock_report_may.txt", RESTOCK_TXT);
        self.write("files/inventory_file.csv", INVENTORY_CSV);
        self.write("files/informed_csv_export.csv", INFORMED_CSV);
        self.path().join("files")
    }
}
