//! `whdash columns`: show the header row a report would resolve against.

use std::path::PathBuf;

use serde::Serialize;

use crate::{print_json, CliError};

#[derive(Serialize)]
struct ColumnsOutput<'a> {
    sheet: &'a str,
    columns: &'a [String],
    rows: usize,
}

pub fn cmd_columns(file: PathBuf, sheet: Option<String>, json: bool) -> Result<(), CliError> {
    let loaded = whdash_io::load_sheet(&file, sheet.as_deref()).map_err(CliError::load)?;

    if json {
        return print_json(&ColumnsOutput {
            sheet: &loaded.name,
            columns: &loaded.headers,
            rows: loaded.row_count(),
        });
    }

    for header in &loaded.headers {
        println!("{header}");
    }
    eprintln!("sheet '{}': {} columns, {} rows", loaded.name, loaded.headers.len(), loaded.row_count());
    Ok(())
}
