//! Flat detail rows with dropdown filter values, and the chart series.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{COL_DURATION, COL_END, COL_KEY, COL_PERIOD, COL_REASON, COL_RESULT, COL_START};
use crate::model::{ChartSeries, DetailTable, JoinedRecord, Period, PeriodSummary};
use crate::normalize::{format_datetime, format_number};

/// One display row per record, in source order.
///
/// `extra_columns` names the configured detail columns carried in each
/// record's `extra`; `with_year` must match the pivot's period labels.
pub fn build_detail(
    records: &[JoinedRecord],
    extra_columns: &[String],
    filter_columns: &[String],
    with_year: bool,
) -> DetailTable {
    let mut columns: Vec<String> = [
        COL_KEY,
        COL_START,
        COL_END,
        COL_DURATION,
        COL_RESULT,
        COL_PERIOD,
        COL_REASON,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    columns.extend(extra_columns.iter().cloned());

    let opt_dt = |dt: &Option<chrono::NaiveDateTime>| dt.as_ref().map(format_datetime).unwrap_or_default();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let mut row = vec![
                r.key.clone(),
                opt_dt(&r.start),
                opt_dt(&r.end),
                r.duration.map(format_number).unwrap_or_default(),
                r.classification.to_string(),
                r.period_date()
                    .map(|d| Period::of(d).label(with_year))
                    .unwrap_or_default(),
                r.reason.clone(),
            ];
            for name in extra_columns {
                let value = r
                    .extra
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                row.push(value);
            }
            row
        })
        .collect();

    let mut filters = BTreeMap::new();
    for name in filter_columns {
        let Some(ci) = columns.iter().position(|c| c == name) else {
            log::warn!("filter column '{name}' is not a detail column; skipped");
            continue;
        };
        let values = if name == COL_PERIOD {
            chronological_periods(records, with_year)
        } else {
            let distinct: BTreeSet<&str> = rows
                .iter()
                .map(|row| row[ci].as_str())
                .filter(|v| !v.is_empty())
                .collect();
            distinct.into_iter().map(str::to_string).collect()
        };
        filters.insert(name.clone(), values);
    }

    DetailTable {
        columns,
        rows,
        filters,
    }
}

fn chronological_periods(records: &[JoinedRecord], with_year: bool) -> Vec<String> {
    let periods: BTreeSet<Period> = records
        .iter()
        .filter_map(JoinedRecord::period_date)
        .map(Period::of)
        .collect();
    let mut labels: Vec<String> = Vec::new();
    for p in periods {
        let label = p.label(with_year);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// One Hit-% point per period plus a flat target line.
pub fn build_chart(periods: &[PeriodSummary], target_pct: f64) -> ChartSeries {
    ChartSeries {
        labels: periods.iter().map(|p| p.label.clone()).collect(),
        hit_percentage: periods.iter().map(|p| p.hit_percentage as u64).collect(),
        target: vec![target_pct; periods.len()],
    }
}
