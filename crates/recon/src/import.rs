//! Shared pieces of the sheet importers: per-row issues, placeholders and
//! "at least one of" column checks.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::alias::{AliasTable, Resolution};
use crate::error::ReconError;
use crate::model::{CellValue, RawSheet};
use crate::normalize::{normalize_text, TaskStatus};

/// Rendered in place of a missing identifying value (week, task, WH...).
pub const PLACEHOLDER: &str = "—";

/// A data row the importer could not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Spreadsheet row number, counting the header as row 1.
    pub row: usize,
    pub message: String,
}

impl RowIssue {
    /// `index` is the 0-based data row index in the sheet.
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            row: sheet_row(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Accepted rows plus the rows that were rejected.
#[derive(Debug, Clone, Serialize)]
pub struct Imported<T> {
    pub sheet: String,
    pub rows: Vec<T>,
    pub issues: Vec<RowIssue>,
}

impl<T> Imported<T> {
    pub fn new(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            rows: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn finish(self) -> Self {
        log::info!(
            "sheet '{}': imported {} rows, rejected {}",
            self.sheet,
            self.rows.len(),
            self.issues.len()
        );
        for issue in &self.issues {
            log::warn!("sheet '{}': {issue}", self.sheet);
        }
        self
    }
}

pub fn sheet_row(index: usize) -> usize {
    index + 2
}

/// The first `limit` headers, for "available columns" hints.
pub fn header_preview(headers: &[String], limit: usize) -> Vec<String> {
    headers.iter().take(limit).cloned().collect()
}

pub fn or_placeholder(s: String) -> String {
    if s.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        s
    }
}

pub fn is_blank_row(sheet: &RawSheet, index: usize) -> bool {
    sheet
        .rows
        .get(index)
        .map_or(true, |r| r.iter().all(CellValue::is_empty))
}

/// Normalized text of `field` in row `index`; `""` when the column is absent.
pub fn text(sheet: &RawSheet, cols: &Resolution, field: &str, index: usize) -> String {
    cols.index_of(field)
        .map(|c| normalize_text(sheet.cell(index, c)))
        .unwrap_or_default()
}

/// Resolve `fields` and fail unless at least one of `any_of` resolved.
pub fn require_any(
    table: &AliasTable,
    sheet: &RawSheet,
    fields: &[&str],
    any_of: &[&str],
) -> Result<Resolution, ReconError> {
    let cols = table.resolve_all(&sheet.headers, fields)?;
    if any_of.iter().any(|f| cols.index_of(f).is_some()) {
        Ok(cols)
    } else {
        Err(ReconError::NoneOfColumns {
            sheet: sheet.name.clone(),
            fields: any_of.iter().map(|f| f.to_string()).collect(),
        })
    }
}

/// Fail with every missing field when any of `required` did not resolve.
pub fn ensure_found(sheet: &RawSheet, cols: &Resolution, required: &[&str]) -> Result<(), ReconError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|f| cols.index_of(f).is_none())
        .map(|f| f.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReconError::MissingColumns {
            sheet: sheet.name.clone(),
            fields: missing,
        })
    }
}

pub fn count_statuses(statuses: impl IntoIterator<Item = TaskStatus>) -> BTreeMap<TaskStatus, usize> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status).or_insert(0) += 1;
    }
    counts
}
