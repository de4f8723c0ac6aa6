use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime};

use crate::aggregate::build_pivot;
use crate::alias::resolve_index;
use crate::classify::classify;
use crate::config::{
    ReportConfig, FIELD_END, FIELD_FALLBACK_DATE, FIELD_FILTER, FIELD_KEY, FIELD_REASON, FIELD_START,
};
use crate::detail::{build_chart, build_detail};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::matcher::join_on_key;
use crate::model::{
    JoinStats, JoinedRecord, KeyMode, RawSheet, ReportInput, ReportMeta, ReportResult, ReportStatus,
};
use crate::normalize::{normalize_text, parse_datetime};

/// Column positions on the primary sheet.
struct PrimaryColumns {
    key: usize,
    start: usize,
    end: Option<usize>,
    reason: Option<usize>,
    fallback_date: Option<usize>,
    filter: Option<usize>,
    detail: Vec<(String, usize)>,
}

/// Run one report. Every call recomputes from the supplied sheets.
pub fn run(config: &ReportConfig, input: &ReportInput) -> Result<ReportResult, ReconError> {
    let primary = &input.primary;
    let cols = resolve_primary(config, primary, input.secondary.is_none())?;

    let rows = select_rows(config, primary, &cols);
    let mut status = if primary.is_empty() {
        ReportStatus::EmptySource
    } else if rows.is_empty() {
        ReportStatus::NoMatchingRows
    } else {
        ReportStatus::Ready
    };

    let keys: Vec<String> = rows
        .iter()
        .map(|&r| normalize_text(primary.cell(r, cols.key)))
        .collect();

    let (ends, join) = match (&input.secondary, cols.end) {
        (Some(secondary), _) => join_secondary(config, secondary, &keys)?,
        (None, Some(end_col)) => {
            let ends = rows
                .iter()
                .map(|&r| parse_datetime(primary.cell(r, end_col)))
                .collect();
            let join = JoinStats {
                mode: KeyMode::SingleSheet,
                primary_rows: rows.len(),
                matched_rows: rows.len(),
            };
            (ends, join)
        }
        (None, None) => {
            return Err(ReconError::MissingColumns {
                sheet: primary.name.clone(),
                fields: vec![FIELD_END.into()],
            })
        }
    };

    let mut records: Vec<JoinedRecord> = rows
        .iter()
        .zip(keys)
        .zip(ends)
        .map(|((&r, key), end)| {
            let start = parse_datetime(primary.cell(r, cols.start));
            let measured = classify(start, end, &config.threshold);
            JoinedRecord {
                key,
                start,
                end,
                fallback_date: cols.fallback_date.and_then(|c| parse_datetime(primary.cell(r, c))),
                reason: cols
                    .reason
                    .map(|c| normalize_text(primary.cell(r, c)))
                    .unwrap_or_default(),
                classification: measured.classification,
                duration: measured.duration,
                extra: cols
                    .detail
                    .iter()
                    .map(|(name, c)| (name.clone(), normalize_text(primary.cell(r, *c))))
                    .collect(),
            }
        })
        .collect();

    // Pivot, detail, chart and summary all see the same year.
    if let Some(year) = config.report.year {
        let before = records.len();
        records.retain(|r| r.period_date().is_some_and(|d| d.year() == year));
        log::debug!("year {year}: kept {} of {before} records", records.len());
        if records.is_empty() && status == ReportStatus::Ready {
            status = ReportStatus::NoMatchingRows;
        }
    }

    let requested = config.report.requested_months();
    let (periods, pivot) = build_pivot(&records, config.report.year, &requested);

    let years: BTreeSet<i32> = periods.iter().map(|p| p.period.year).collect();
    let extra_columns: Vec<String> = cols.detail.iter().map(|(n, _)| n.clone()).collect();
    let detail = build_detail(
        &records,
        &extra_columns,
        &config.report.filter_columns,
        years.len() > 1,
    );
    let chart = build_chart(&periods, config.report.target_pct);
    let summary = compute_summary(&records, join);

    log::info!(
        "report '{}': {} records ({} hit, {} miss, {} pending), {} periods",
        config.name,
        summary.total_records,
        summary.hit,
        summary.miss,
        summary.pending,
        periods.len()
    );

    Ok(ReportResult {
        meta: ReportMeta {
            config_name: config.name.clone(),
            threshold: config.threshold.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        status,
        summary,
        periods,
        pivot,
        detail,
        chart,
        records,
    })
}

fn resolve_primary(
    config: &ReportConfig,
    primary: &RawSheet,
    single_sheet: bool,
) -> Result<PrimaryColumns, ReconError> {
    let table = config.columns.alias_table();

    let mut required = vec![FIELD_KEY, FIELD_START];
    if single_sheet {
        required.push(FIELD_END);
    }
    let mut resolution = table.resolve_all(&primary.headers, &required)?;

    let filter = match config.filter {
        Some(ref f) => {
            let idx = resolve_index(&primary.headers, &f.column);
            if idx.is_none() {
                resolution.missing.push(FIELD_FILTER.into());
            }
            idx
        }
        None => None,
    };

    if !resolution.missing.is_empty() {
        return Err(ReconError::MissingColumns {
            sheet: primary.name.clone(),
            fields: resolution.missing,
        });
    }

    let optional = |field: &str| {
        table
            .get(field)
            .and_then(|alias| resolve_index(&primary.headers, &alias.candidates))
    };

    let mut detail = Vec::new();
    for alias in config.columns.detail_aliases() {
        match resolve_index(&primary.headers, &alias.candidates) {
            Some(idx) => detail.push((alias.name, idx)),
            None => log::warn!(
                "sheet '{}': detail column '{}' not found; skipped",
                primary.name,
                alias.name
            ),
        }
    }

    let (Some(key), Some(start)) = (resolution.index_of(FIELD_KEY), resolution.index_of(FIELD_START))
    else {
        return Err(ReconError::MissingColumns {
            sheet: primary.name.clone(),
            fields: vec![FIELD_KEY.into(), FIELD_START.into()],
        });
    };

    Ok(PrimaryColumns {
        key,
        start,
        end: resolution.index_of(FIELD_END),
        reason: optional(FIELD_REASON),
        fallback_date: optional(FIELD_FALLBACK_DATE),
        filter,
        detail,
    })
}

/// Indices of non-blank primary rows that pass the configured filter.
fn select_rows(config: &ReportConfig, primary: &RawSheet, cols: &PrimaryColumns) -> Vec<usize> {
    let wanted: Vec<String> = config
        .filter
        .as_ref()
        .map(|f| f.values.iter().map(|v| v.trim().to_lowercase()).collect())
        .unwrap_or_default();

    (0..primary.row_count())
        .filter(|&r| primary.rows[r].iter().any(|c| !c.is_empty()))
        .filter(|&r| match cols.filter {
            Some(fc) => {
                let value = normalize_text(primary.cell(r, fc)).to_lowercase();
                wanted.iter().any(|w| *w == value)
            }
            None => true,
        })
        .collect()
}

fn join_secondary(
    config: &ReportConfig,
    secondary: &RawSheet,
    keys: &[String],
) -> Result<(Vec<Option<NaiveDateTime>>, JoinStats), ReconError> {
    let table = config.columns.alias_table();
    let resolution = table.require(&secondary.name, &secondary.headers, &[FIELD_KEY, FIELD_END])?;
    let (Some(key_col), Some(end_col)) = (resolution.index_of(FIELD_KEY), resolution.index_of(FIELD_END))
    else {
        return Err(ReconError::MissingColumns {
            sheet: secondary.name.clone(),
            fields: vec![FIELD_KEY.into(), FIELD_END.into()],
        });
    };

    let pairs: Vec<(String, Option<NaiveDateTime>)> = (0..secondary.row_count())
        .map(|r| {
            (
                normalize_text(secondary.cell(r, key_col)),
                parse_datetime(secondary.cell(r, end_col)),
            )
        })
        .collect();

    let out = join_on_key(keys, &pairs);
    let ends = out.values.into_iter().map(Option::flatten).collect();
    let stats = JoinStats {
        mode: out.mode,
        primary_rows: keys.len(),
        matched_rows: out.matched_rows,
    };
    Ok((ends, stats))
}
