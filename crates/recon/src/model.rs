use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as it came out of the source workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One imported sheet: header row plus data rows aligned to it by position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a sheet from plain text cells. Empty strings become `Empty`.
    pub fn from_text_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut sheet = Self::new(name, headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            sheet.rows.push(row.iter().map(|c| CellValue::from(*c)).collect());
        }
        sheet
    }

    /// Cell at (row, col). Ragged rows read as `Empty` past their end.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(CellValue::is_empty))
    }
}

/// Pre-loaded sheets for one report run.
pub struct ReportInput {
    pub primary: RawSheet,
    pub secondary: Option<RawSheet>,
}

// ---------------------------------------------------------------------------
// Join + Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Classification {
    Hit,
    Miss,
    Pending,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "Hit"),
            Self::Miss => write!(f, "Miss"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// Which key form produced the cross-sheet join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// Both timestamps come from the primary sheet; no join performed.
    SingleSheet,
    /// Keys compared after trimming whitespace.
    Trimmed,
    /// Keys compared after stripping leading zeros / numeric canonicalization.
    Canonical,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinStats {
    pub mode: KeyMode,
    pub primary_rows: usize,
    pub matched_rows: usize,
}

/// One business record after joining both sheets and classifying it.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedRecord {
    pub key: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub fallback_date: Option<NaiveDateTime>,
    pub reason: String,
    pub classification: Classification,
    /// Hours (2 decimals) or whole business days, depending on threshold mode.
    pub duration: Option<f64>,
    /// Extra detail columns as (display name, normalized text).
    pub extra: Vec<(String, String)>,
}

impl JoinedRecord {
    /// Date used for period grouping: start, else the fallback date field.
    pub fn period_date(&self) -> Option<NaiveDate> {
        self.start.or(self.fallback_date).map(|dt| dt.date())
    }
}

// ---------------------------------------------------------------------------
// Periods
// ---------------------------------------------------------------------------

pub const MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn abbr(&self) -> &'static str {
        MONTH_ABBRS[(self.month as usize).saturating_sub(1) % 12]
    }

    /// `Jan`, or `Jan 2024` when the report spans several years.
    pub fn label(&self, with_year: bool) -> String {
        if with_year {
            format!("{} {}", self.abbr(), self.year)
        } else {
            self.abbr().to_string()
        }
    }
}

/// Parse a month abbreviation or full month name (case-insensitive) to 1..=12.
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_ABBRS
        .iter()
        .position(|abbr| lower.starts_with(&abbr.to_lowercase()))
        .map(|i| i as u32 + 1)
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub label: String,
    /// Distinct keys seen in the period, Pending included.
    pub unique_keys: usize,
    /// Hit + Miss. Pending records are not part of the total.
    pub total_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub hit_percentage: u32,
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

pub const YEAR_TOTAL_LABEL: &str = "Year Total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotRowKind {
    HitPercentage,
    Hit,
    Miss,
    Reason,
    Total,
}

#[derive(Debug, Clone, Serialize)]
pub struct PivotRow {
    pub label: String,
    pub kind: PivotRowKind,
    /// One value per entry in `PivotTable::columns`.
    pub values: Vec<u64>,
    pub year_total: u64,
}

/// Period columns x KPI rows, plus a trailing year-total column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PivotTable {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
    /// Placeholder messages for requested periods that had no rows.
    pub notices: Vec<String>,
}

impl PivotTable {
    pub fn row(&self, label: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Value of `row_label` in the `column` period, if both exist.
    pub fn value(&self, row_label: &str, column: &str) -> Option<u64> {
        let ci = self.columns.iter().position(|c| c == column)?;
        self.row(row_label).and_then(|r| r.values.get(ci).copied())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Distinct values per filterable column, for client-side dropdowns.
    pub filters: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub hit_percentage: Vec<u64>,
    pub target: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    /// Primary sheet had a header row but no data.
    EmptySource,
    /// The row filter or the report year removed every row.
    NoMatchingRows,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub hit: usize,
    pub miss: usize,
    pub pending: usize,
    pub hit_percentage: u32,
    pub join: JoinStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub threshold: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub meta: ReportMeta,
    pub status: ReportStatus,
    pub summary: ReportSummary,
    pub periods: Vec<PeriodSummary>,
    pub pivot: PivotTable,
    pub detail: DetailTable,
    pub chart: ChartSeries,
    #[serde(skip)]
    pub records: Vec<JoinedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_read_as_empty() {
        let sheet = RawSheet::from_text_rows("s", &["A", "B"], &[&["x"]]);
        assert_eq!(sheet.cell(0, 0), &CellValue::Text("x".into()));
        assert_eq!(sheet.cell(0, 1), &CellValue::Empty);
        assert_eq!(sheet.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn month_names_parse() {
        assert_eq!(month_from_name("Jan"), Some(1));
        assert_eq!(month_from_name("september"), Some(9));
        assert_eq!(month_from_name(" DEC "), Some(12));
        assert_eq!(month_from_name("Ja"), None);
        assert_eq!(month_from_name("Smarch"), None);
    }

    #[test]
    fn period_labels() {
        let p = Period { year: 2024, month: 3 };
        assert_eq!(p.label(false), "Mar");
        assert_eq!(p.label(true), "Mar 2024");
    }

    #[test]
    fn blank_sheet_is_empty() {
        let sheet = RawSheet::from_text_rows("s", &["A"], &[&[""], &["  "]]);
        assert!(sheet.is_empty());
    }
}
