// Excel import (xlsx, xlsm, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use whdash_recon::model::{CellValue, RawSheet};
use whdash_recon::normalize::parse_datetime_str;

use crate::{sheet_from_grid, LoadError};

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, LoadError> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Workbook(format!("{}: {e}", path.display())))?;
    Ok(workbook.sheet_names())
}

/// Index of `wanted` in `names`, ignoring case and whitespace.
pub fn find_sheet(names: &[String], wanted: &str) -> Option<usize> {
    let fold = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let target = fold(wanted);
    names.iter().position(|n| fold(n) == target)
}

pub fn load(path: &Path, sheet: Option<&str>) -> Result<RawSheet, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Workbook(format!("{}: {e}", path.display())))?;
    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(LoadError::SheetNotFound {
            file: path.display().to_string(),
        });
    }

    let idx = match sheet {
        Some(wanted) => find_sheet(&names, wanted).unwrap_or_else(|| {
            log::warn!(
                "{}: sheet '{}' not found, using '{}'",
                path.display(),
                wanted,
                names[0]
            );
            0
        }),
        None => 0,
    };
    let name = &names[idx];

    let range = workbook
        .worksheet_range(name)
        .map_err(|e| LoadError::Workbook(format!("sheet '{name}': {e}")))?;

    // Range start offset (data may not begin at A1); leading blank columns
    // are kept so header positions stay aligned with the data.
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; pad];
            cells.extend(row.iter().map(cell_value));
            cells
        })
        .collect();

    Ok(sheet_from_grid(name, grid))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Formula errors carry no usable value.
        Data::Error(e) => {
            log::debug!("cell error {e:?} read as empty");
            CellValue::Empty
        }
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        // calamine applies the workbook's 1900/1904 date system.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => parse_datetime_str(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
