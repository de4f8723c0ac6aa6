use std::collections::BTreeMap;

use serde::Deserialize;

use crate::alias::{AliasTable, ColumnAlias};
use crate::classify::Threshold;
use crate::error::ReconError;
use crate::model::month_from_name;

/// Logical field names used by duration reports.
pub const FIELD_KEY: &str = "key";
pub const FIELD_START: &str = "start";
pub const FIELD_END: &str = "end";
pub const FIELD_REASON: &str = "reason";
pub const FIELD_FALLBACK_DATE: &str = "fallback_date";
pub const FIELD_FILTER: &str = "filter";

/// Detail-table columns that are always present.
pub const COL_KEY: &str = "Key";
pub const COL_START: &str = "Start";
pub const COL_END: &str = "End";
pub const COL_DURATION: &str = "Duration";
pub const COL_RESULT: &str = "Result";
pub const COL_PERIOD: &str = "Period";
pub const COL_REASON: &str = "Reason";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub source: SourceConfig,
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub threshold: Threshold,
    #[serde(default)]
    pub filter: Option<RowFilter>,
    #[serde(default)]
    pub report: ReportOptions,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub primary: SheetSource,
    /// Second sheet carrying the end timestamp. Absent = both on primary.
    #[serde(default)]
    pub secondary: Option<SheetSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetSource {
    pub file: String,
    /// Preferred sheet name; the loader falls back to the first sheet.
    #[serde(default)]
    pub sheet: Option<String>,
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsConfig {
    pub key: Vec<String>,
    pub start: Vec<String>,
    pub end: Vec<String>,
    #[serde(default)]
    pub reason: Vec<String>,
    #[serde(default)]
    pub fallback_date: Vec<String>,
    /// Extra detail columns: display name -> candidate headers.
    #[serde(default)]
    pub detail: BTreeMap<String, Vec<String>>,
}

impl ColumnsConfig {
    /// Alias table for the report's logical fields. Optional fields with no
    /// candidates are left out.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::new();
        for (name, candidates) in [
            (FIELD_KEY, &self.key),
            (FIELD_START, &self.start),
            (FIELD_END, &self.end),
            (FIELD_REASON, &self.reason),
            (FIELD_FALLBACK_DATE, &self.fallback_date),
        ] {
            if !candidates.is_empty() {
                table.insert(ColumnAlias {
                    name: name.to_string(),
                    candidates: candidates.clone(),
                });
            }
        }
        table
    }

    pub fn detail_aliases(&self) -> Vec<ColumnAlias> {
        self.detail
            .iter()
            .map(|(name, candidates)| ColumnAlias {
                name: name.clone(),
                candidates: candidates.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Filter + Report options
// ---------------------------------------------------------------------------

/// Keep only primary rows whose `column` value is one of `values`
/// (case-insensitive, after text normalization).
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: Vec<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportOptions {
    /// Months the caller expects to see (`"Jan"`, `"February"`, ...).
    #[serde(default)]
    pub periods: Vec<String>,
    /// Restrict aggregation to one calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default = "default_target_pct")]
    pub target_pct: f64,
    #[serde(default = "default_filter_columns")]
    pub filter_columns: Vec<String>,
}

fn default_target_pct() -> f64 {
    95.0
}

fn default_filter_columns() -> Vec<String> {
    vec![COL_PERIOD.into(), COL_RESULT.into(), COL_REASON.into()]
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            periods: Vec::new(),
            year: None,
            target_pct: default_target_pct(),
            filter_columns: default_filter_columns(),
        }
    }
}

impl ReportOptions {
    /// Requested months as 1..=12. Unknown names are dropped (rejected by
    /// validation before a run).
    pub fn requested_months(&self) -> Vec<u32> {
        self.periods.iter().filter_map(|p| month_from_name(p)).collect()
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReportConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReportConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        for (field, candidates) in [
            (FIELD_KEY, &self.columns.key),
            (FIELD_START, &self.columns.start),
            (FIELD_END, &self.columns.end),
        ] {
            if candidates.iter().all(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} needs at least one candidate header"
                )));
            }
        }

        for (name, candidates) in &self.columns.detail {
            if candidates.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.detail.{name} needs at least one candidate header"
                )));
            }
        }

        if let Threshold::Hours { hours } = self.threshold {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "threshold.hours must be a positive number, got {hours}"
                )));
            }
        }

        if let Some(ref filter) = self.filter {
            if filter.column.is_empty() || filter.values.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "filter needs both column candidates and values".into(),
                ));
            }
        }

        for p in &self.report.periods {
            if month_from_name(p).is_none() {
                return Err(ReconError::ConfigValidation(format!(
                    "report.periods: '{p}' is not a month name"
                )));
            }
        }

        let target = self.report.target_pct;
        if !(0.0..=100.0).contains(&target) {
            return Err(ReconError::ConfigValidation(format!(
                "report.target_pct must be within 0..=100, got {target}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
