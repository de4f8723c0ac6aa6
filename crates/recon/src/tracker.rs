//! Weekly project tracker import (`Week | Task | Status | Progress % | Impact`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alias::AliasTable;
use crate::error::ReconError;
use crate::import::{count_statuses, or_placeholder};
use crate::model::RawSheet;
use crate::normalize::{normalize_percent, normalize_status, normalize_text, TaskStatus};

pub use crate::import::PLACEHOLDER;

const FIELD_WEEK: &str = "week";
const FIELD_TASK: &str = "task";
const FIELD_STATUS: &str = "status";
const FIELD_PROGRESS: &str = "progress";
const FIELD_IMPACT: &str = "impact";

/// Number of headers shown when the progress column cannot be found.
pub const HEADER_PREVIEW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerRow {
    pub week: String,
    pub task: String,
    pub status: TaskStatus,
    pub progress_pct: u32,
    pub impact: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackerSummary {
    pub rows: usize,
    pub by_status: BTreeMap<TaskStatus, usize>,
    pub mean_progress: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyTracker {
    pub rows: Vec<TrackerRow>,
    pub summary: TrackerSummary,
}

pub fn tracker_aliases() -> AliasTable {
    AliasTable::new()
        .with(FIELD_WEEK, &["Week"])
        .with(FIELD_TASK, &["Task"])
        .with(FIELD_STATUS, &["Status"])
        .with(
            FIELD_PROGRESS,
            &["Progress %", "Progress%", "Progress", "Progress (%)", "% Progress"],
        )
        .with(FIELD_IMPACT, &["Impact"])
}

/// Import the weekly tracker rows from `sheet`.
///
/// Week, task and progress columns are required; status and impact are
/// optional. Rows with neither a week nor a task are skipped.
pub fn import_weekly(sheet: &RawSheet) -> Result<WeeklyTracker, ReconError> {
    let table = tracker_aliases();
    let required = table.resolve_all(&sheet.headers, &[FIELD_WEEK, FIELD_TASK, FIELD_PROGRESS])?;
    if !required.missing.is_empty() {
        if required.missing.iter().any(|f| f == FIELD_PROGRESS) {
            log::warn!(
                "sheet '{}': no progress column; available: {}",
                sheet.name,
                header_preview(&sheet.headers).join(", ")
            );
        }
        return Err(ReconError::MissingColumns {
            sheet: sheet.name.clone(),
            fields: required.missing,
        });
    }
    let optional = table.resolve_all(&sheet.headers, &[FIELD_STATUS, FIELD_IMPACT])?;

    let (Some(week_col), Some(task_col), Some(progress_col)) = (
        required.index_of(FIELD_WEEK),
        required.index_of(FIELD_TASK),
        required.index_of(FIELD_PROGRESS),
    ) else {
        return Err(ReconError::MissingColumns {
            sheet: sheet.name.clone(),
            fields: vec![FIELD_WEEK.into(), FIELD_TASK.into(), FIELD_PROGRESS.into()],
        });
    };
    let status_col = optional.index_of(FIELD_STATUS);
    let impact_col = optional.index_of(FIELD_IMPACT);

    let mut rows = Vec::new();
    for r in 0..sheet.row_count() {
        let week = normalize_text(sheet.cell(r, week_col));
        let task = normalize_text(sheet.cell(r, task_col));
        if week.is_empty() && task.is_empty() {
            continue;
        }
        let status = status_col
            .map(|c| normalize_status(&normalize_text(sheet.cell(r, c))))
            .unwrap_or(TaskStatus::NotStarted);
        rows.push(TrackerRow {
            week: or_placeholder(week),
            task: or_placeholder(task),
            status,
            progress_pct: normalize_percent(sheet.cell(r, progress_col)),
            impact: impact_col
                .map(|c| normalize_text(sheet.cell(r, c)))
                .unwrap_or_default(),
        });
    }

    log::info!("sheet '{}': imported {} tracker rows", sheet.name, rows.len());
    let summary = summarize(&rows);
    Ok(WeeklyTracker { rows, summary })
}

/// The first few headers, for error hints.
pub fn header_preview(headers: &[String]) -> Vec<String> {
    crate::import::header_preview(headers, HEADER_PREVIEW)
}

pub fn summarize(rows: &[TrackerRow]) -> TrackerSummary {
    let by_status = count_statuses(rows.iter().map(|r| r.status));
    let mean_progress = if rows.is_empty() {
        0
    } else {
        let sum: u64 = rows.iter().map(|r| r.progress_pct as u64).sum();
        (sum as f64 / rows.len() as f64).round() as u32
    };
    TrackerSummary {
        rows: rows.len(),
        by_status,
        mean_progress,
    }
}
