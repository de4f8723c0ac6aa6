//! Cell-level cleanup: text, dates, percentages, status strings.
//!
//! Nothing here fails. Values that cannot be interpreted come back as empty
//! text, `None` dates, or a 0 percentage.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::model::CellValue;

/// Spreadsheet exports write these for blank cells.
const TEXTUAL_NULLS: [&str; 3] = ["nan", "nat", "none"];

/// Excel serial day 0 in the 1900 date system (accounts for the 1900 leap bug).
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.999_999;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%d %b %Y %H:%M",
    "%b %d, %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Trimmed display text; textual nulls and blanks become `""`.
pub fn normalize_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => normalize_str(s),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        CellValue::DateTime(dt) => format_datetime(dt),
    }
}

pub fn normalize_str(s: &str) -> String {
    let trimmed = s.trim();
    if TEXTUAL_NULLS.iter().any(|n| trimmed.eq_ignore_ascii_case(n)) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Integral values print without a fractional part (`1.0` -> `1`).
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        String::new()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `2024-01-05` at midnight, `2024-01-05 08:30` otherwise.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Interpret a cell as a timestamp. Unparseable input is `None`.
pub fn parse_datetime(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Number(n) => from_excel_serial(*n),
        CellValue::Text(s) => parse_datetime_str(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Convert an Excel serial (days since 1899-12-30, fraction = time of day).
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(millis))
}

pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = normalize_str(s);
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Numbers stored as text ("45292.5") are still serials.
    s.parse::<f64>().ok().and_then(from_excel_serial)
}

// ---------------------------------------------------------------------------
// Percentages
// ---------------------------------------------------------------------------

/// Percentage in 0..=100. Fractions in [0, 1] are scaled by 100.
pub fn normalize_percent(cell: &CellValue) -> u32 {
    match cell {
        CellValue::Number(n) => percent_from_f64(*n),
        CellValue::Text(s) => {
            let cleaned = normalize_str(s);
            let cleaned = cleaned.trim_end_matches('%').trim();
            cleaned.parse::<f64>().map(percent_from_f64).unwrap_or(0)
        }
        _ => 0,
    }
}

fn percent_from_f64(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let scaled = if (0.0..=1.0).contains(&value) && value.fract() != 0.0 {
        value * 100.0
    } else {
        value
    };
    scaled.round().clamp(0.0, 100.0) as u32
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Best-effort mapping of free-text status to three states.
pub fn normalize_status(raw: &str) -> TaskStatus {
    let s = normalize_str(raw).to_lowercase();
    if s.contains("completed") || s.contains("done") {
        TaskStatus::Completed
    } else if s.contains("progress") {
        TaskStatus::InProgress
    } else {
        TaskStatus::NotStarted
    }
}
