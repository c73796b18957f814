use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::PreviewArgs,
    data::SourceName,
    io_utils,
    sources::{self, LoadOptions},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let name = args.source.unwrap_or(SourceName::RestockReport);
    let path = match (&args.input, args.source) {
        (Some(path), _) => path.clone(),
        (None, Some(source)) => sources::discover(&args.files_dir, source.as_str())
            .with_context(|| format!("Locating the {source} source"))?,
        (None, None) => return Err(anyhow!("Preview requires --source or --input")),
    };
    let options = LoadOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    let loaded = sources::load_table(&path, name, options)?;

    let rows = loaded
        .rows()
        .iter()
        .take(args.rows)
        .map(|row| row.values().iter().map(|v| v.as_display()).collect())
        .collect::<Vec<Vec<String>>>();
    table::print_table(loaded.headers(), &rows);
    info!("Displayed {} of {} row(s) from {:?}", rows.len(), loaded.len(), path);
    Ok(())
}
