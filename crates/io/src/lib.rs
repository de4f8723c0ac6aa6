// Workbook loading and report export

pub mod csv;
pub mod export;
pub mod xlsx;

use std::path::{Path, PathBuf};

use thiserror::Error;
use whdash_recon::model::{CellValue, RawSheet};
use whdash_recon::normalize::normalize_text;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("{file}: no sheet to read")]
    SheetNotFound { file: String },
    #[error("unsupported file type '{0}' (expected xlsx, xlsm, xls, xlsb, ods, csv, tsv or txt)")]
    UnsupportedFormat(String),
    #[error("failed to read workbook: {0}")]
    Workbook(String),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to write xlsx: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

enum Format {
    Excel,
    Delimited { tab: bool },
}

fn format_of(path: &Path) -> Result<Format, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Format::Excel),
        "csv" | "txt" => Ok(Format::Delimited { tab: false }),
        "tsv" => Ok(Format::Delimited { tab: true }),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

/// Load one sheet from a workbook or delimited text file.
///
/// `sheet` is only meaningful for workbooks; when it does not match any
/// sheet the first one is used.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<RawSheet, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let loaded = match format_of(path)? {
        Format::Excel => xlsx::load(path, sheet)?,
        Format::Delimited { tab } => csv::load(path, tab)?,
    };
    log::debug!(
        "{}: sheet '{}' with {} columns, {} rows",
        path.display(),
        loaded.name,
        loaded.headers.len(),
        loaded.rows.len()
    );
    Ok(loaded)
}

/// Split a cell grid into header row and data rows. The first row with any
/// non-empty cell is the header; rows above it are dropped.
pub(crate) fn sheet_from_grid(name: &str, grid: Vec<Vec<CellValue>>) -> RawSheet {
    let mut rows = grid.into_iter().skip_while(|r| r.iter().all(CellValue::is_empty));
    let Some(header) = rows.next() else {
        return RawSheet::new(name, Vec::new());
    };

    let mut sheet = RawSheet::new(name, header.iter().map(normalize_text).collect());
    sheet.rows = rows.collect();
    while sheet
        .rows
        .last()
        .is_some_and(|r| r.iter().all(CellValue::is_empty))
    {
        sheet.rows.pop();
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_first_non_empty_row() {
        let grid = vec![
            vec![CellValue::Empty, CellValue::Empty],
            vec!["Order".into(), "Created".into()],
            vec!["1".into(), "2024-01-01".into()],
            vec![CellValue::Empty, CellValue::Empty],
        ];
        let sheet = sheet_from_grid("s", grid);
        assert_eq!(sheet.headers, vec!["Order", "Created"]);
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn empty_grid() {
        let sheet = sheet_from_grid("s", Vec::new());
        assert!(sheet.headers.is_empty());
        assert!(sheet.is_empty());
    }

    #[test]
    fn missing_file_and_bad_extension() {
        let err = load_sheet(Path::new("/nonexistent/orders.xlsx"), None).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let err = load_sheet(&path, None).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "pdf"));
    }
}
