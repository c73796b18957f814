pub mod cli;
pub mod columns;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod matcher;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod preview;
pub mod processors;
pub mod reconcile;
pub mod sources;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    data::{CellValue, Row, SourceName, SourceTable},
    error::ReconcileError,
    mapping::{ColumnSpec, MappingSpec},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("restock_recon", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("{:?}", cli.command);
    match cli.command {
        Commands::Reconcile(args) => reconcile::execute(&args),
        Commands::Columns(args) => mapping::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}
