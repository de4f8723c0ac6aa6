//! Project tracker rollup: items grouped by start month with per-phase progress.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::aggregate::percentage;
use crate::alias::AliasTable;
use crate::error::ReconError;
use crate::model::{Period, RawSheet};
use crate::normalize::{normalize_text, parse_datetime};

const FIELD_DESCRIPTION: &str = "description";
const FIELD_PERSON: &str = "person";
const FIELD_TYPE: &str = "type";
const FIELD_COMPANY: &str = "company";
const FIELD_START: &str = "start_date";
const FIELD_END: &str = "end_date";
const FIELD_BRAINSTORMING: &str = "brainstorming";
const FIELD_EXECUTION: &str = "execution";
const FIELD_LAUNCH: &str = "launch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Idea,
    Automation,
}

impl ProjectType {
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        if s.contains("idea") {
            Some(Self::Idea)
        } else if s.contains("automation") {
            Some(Self::Automation)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Done,
    WorkingOnIt,
    Stuck,
    Empty,
}

impl PhaseStatus {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.contains("done") {
            Self::Done
        } else if s.contains("working") || s.contains("progress") {
            Self::WorkingOnIt
        } else if s.contains("stuck") {
            Self::Stuck
        } else {
            Self::Empty
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectItem {
    pub description: String,
    pub person: String,
    pub project_type: Option<ProjectType>,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub brainstorming: PhaseStatus,
    pub execution: PhaseStatus,
    pub launch: PhaseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub done: usize,
    pub working_on_it: usize,
    pub stuck: usize,
    pub empty: usize,
    pub total: usize,
    pub done_pct: u32,
    pub working_on_it_pct: u32,
    pub stuck_pct: u32,
    pub empty_pct: u32,
}

impl PhaseProgress {
    pub fn of(statuses: impl IntoIterator<Item = PhaseStatus>) -> Self {
        let (mut done, mut working_on_it, mut stuck, mut empty) = (0, 0, 0, 0);
        for s in statuses {
            match s {
                PhaseStatus::Done => done += 1,
                PhaseStatus::WorkingOnIt => working_on_it += 1,
                PhaseStatus::Stuck => stuck += 1,
                PhaseStatus::Empty => empty += 1,
            }
        }
        let total = done + working_on_it + stuck + empty;
        let done_pct = percentage(done, total);
        let working_on_it_pct = percentage(working_on_it, total);
        let stuck_pct = percentage(stuck, total);
        // Rounded shares can sum past 100; the remainder absorbs that.
        let empty_pct = if total == 0 {
            100
        } else {
            100u32.saturating_sub(done_pct + working_on_it_pct + stuck_pct)
        };
        Self {
            done,
            working_on_it,
            stuck,
            empty,
            total,
            done_pct,
            working_on_it_pct,
            stuck_pct,
            empty_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectProgress {
    pub brainstorming: PhaseProgress,
    pub execution: PhaseProgress,
    pub launch: PhaseProgress,
}

impl ProjectProgress {
    pub fn of(items: &[ProjectItem]) -> Self {
        Self {
            brainstorming: PhaseProgress::of(items.iter().map(|i| i.brainstorming)),
            execution: PhaseProgress::of(items.iter().map(|i| i.execution)),
            launch: PhaseProgress::of(items.iter().map(|i| i.launch)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthSection {
    pub period: Period,
    pub label: String,
    pub items: Vec<ProjectItem>,
    pub progress: ProjectProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRollup {
    pub sections: Vec<MonthSection>,
    pub project_type: Option<ProjectType>,
}

pub fn project_aliases() -> AliasTable {
    AliasTable::new()
        .with(FIELD_DESCRIPTION, &["Description", "Project"])
        .with(FIELD_PERSON, &["Person", "Person Name", "Owner"])
        .with(FIELD_TYPE, &["Type", "Project Type"])
        .with(FIELD_COMPANY, &["Company"])
        .with(FIELD_START, &["Start Date", "Start"])
        .with(FIELD_END, &["End Date", "End"])
        .with(FIELD_BRAINSTORMING, &["Brainstorming"])
        .with(FIELD_EXECUTION, &["Execution"])
        .with(FIELD_LAUNCH, &["Launch"])
}

/// Read project items from `sheet`. Rows without a parsable start date are
/// dropped, since they cannot be placed in a month.
pub fn import_projects(sheet: &RawSheet) -> Result<Vec<ProjectItem>, ReconError> {
    let table = project_aliases();
    let required = table.require(&sheet.name, &sheet.headers, &[FIELD_DESCRIPTION, FIELD_START])?;
    let optional = table.resolve_all(
        &sheet.headers,
        &[
            FIELD_PERSON,
            FIELD_TYPE,
            FIELD_COMPANY,
            FIELD_END,
            FIELD_BRAINSTORMING,
            FIELD_EXECUTION,
            FIELD_LAUNCH,
        ],
    )?;
    let (Some(desc_col), Some(start_col)) =
        (required.index_of(FIELD_DESCRIPTION), required.index_of(FIELD_START))
    else {
        return Err(ReconError::MissingColumns {
            sheet: sheet.name.clone(),
            fields: vec![FIELD_DESCRIPTION.into(), FIELD_START.into()],
        });
    };

    let text = |r: usize, field: &str| {
        optional
            .index_of(field)
            .map(|c| normalize_text(sheet.cell(r, c)))
            .unwrap_or_default()
    };
    let phase = |r: usize, field: &str| PhaseStatus::parse(&text(r, field));

    let mut items = Vec::new();
    let mut undated = 0;
    for r in 0..sheet.row_count() {
        let description = normalize_text(sheet.cell(r, desc_col));
        let Some(start) = parse_datetime(sheet.cell(r, start_col)) else {
            if !description.is_empty() {
                undated += 1;
            }
            continue;
        };
        items.push(ProjectItem {
            description,
            person: text(r, FIELD_PERSON),
            project_type: ProjectType::parse(&text(r, FIELD_TYPE)),
            company: text(r, FIELD_COMPANY),
            start_date: start.date(),
            end_date: optional
                .index_of(FIELD_END)
                .and_then(|c| parse_datetime(sheet.cell(r, c)))
                .map(|dt| dt.date()),
            brainstorming: phase(r, FIELD_BRAINSTORMING),
            execution: phase(r, FIELD_EXECUTION),
            launch: phase(r, FIELD_LAUNCH),
        });
    }
    if undated > 0 {
        log::warn!("sheet '{}': {undated} project rows without a start date skipped", sheet.name);
    }
    Ok(items)
}

/// Section label relative to `today`.
pub fn month_label(period: Period, today: NaiveDate) -> String {
    let current = Period::of(today);
    let previous = match today.month() {
        1 => Period {
            year: today.year() - 1,
            month: 12,
        },
        m => Period {
            year: today.year(),
            month: m - 1,
        },
    };
    if period == current {
        "This month".to_string()
    } else if period == previous {
        "Last month".to_string()
    } else {
        period.label(true)
    }
}

/// Group items by start month, newest month first and newest start first
/// within a month. `project_type` keeps only items of that type.
pub fn rollup(items: &[ProjectItem], project_type: Option<ProjectType>, today: NaiveDate) -> ProjectRollup {
    let mut months: BTreeMap<Period, Vec<ProjectItem>> = BTreeMap::new();
    for item in items {
        if project_type.is_some_and(|t| item.project_type != Some(t)) {
            continue;
        }
        months
            .entry(Period::of(item.start_date))
            .or_default()
            .push(item.clone());
    }

    let sections = months
        .into_iter()
        .rev()
        .map(|(period, mut items)| {
            // Stable sort keeps sheet order for equal dates.
            items.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            MonthSection {
                period,
                label: month_label(period, today),
                progress: ProjectProgress::of(&items),
                items,
            }
        })
        .collect();

    ProjectRollup {
        sections,
        project_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sheet() -> RawSheet {
        RawSheet::from_text_rows(
            "Projects",
            &[
                "Description",
                "Person",
                "Type",
                "Company",
                "Start Date",
                "End Date",
                "Brainstorming",
                "Execution",
                "Launch",
            ],
            &[
                &["Dock scheduler", "Sara", "Automation", "WH1", "2024-03-02", "2024-03-20", "Done", "Working on it", ""],
                &["Pick path", "Omar", "Idea", "WH1", "2024-03-10", "", "Done", "Stuck", ""],
                &["Label printer", "Lina", "idea", "WH2", "2024-02-14", "", "In progress", "", ""],
                &["Old plan", "Ali", "Idea", "WH2", "2023-11-01", "", "", "", ""],
                &["No date", "Ali", "Idea", "WH2", "", "", "", "", ""],
            ],
        )
    }

    #[test]
    fn phase_status_parsing() {
        assert_eq!(PhaseStatus::parse("Done"), PhaseStatus::Done);
        assert_eq!(PhaseStatus::parse("working on it"), PhaseStatus::WorkingOnIt);
        assert_eq!(PhaseStatus::parse("In Progress"), PhaseStatus::WorkingOnIt);
        assert_eq!(PhaseStatus::parse("STUCK"), PhaseStatus::Stuck);
        assert_eq!(PhaseStatus::parse("later"), PhaseStatus::Empty);
    }

    #[test]
    fn import_skips_undated_rows() {
        let items = import_projects(&sheet()).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].project_type, Some(ProjectType::Automation));
        assert_eq!(items[0].end_date, Some(date("2024-03-20")));
        assert_eq!(items[1].end_date, None);
    }

    #[test]
    fn sections_newest_first_with_relative_labels() {
        let items = import_projects(&sheet()).unwrap();
        let rollup = rollup(&items, None, date("2024-03-15"));
        let labels: Vec<&str> = rollup.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["This month", "Last month", "Nov 2023"]);

        let march = &rollup.sections[0];
        assert_eq!(march.items[0].description, "Pick path");
        assert_eq!(march.items[1].description, "Dock scheduler");
        assert_eq!(march.progress.brainstorming.done, 2);
        assert_eq!(march.progress.brainstorming.done_pct, 100);
        assert_eq!(march.progress.execution.working_on_it_pct, 50);
        assert_eq!(march.progress.execution.stuck_pct, 50);
        assert_eq!(march.progress.launch.empty_pct, 100);
    }

    #[test]
    fn type_filter() {
        let items = import_projects(&sheet()).unwrap();
        let rollup = rollup(&items, Some(ProjectType::Idea), date("2024-03-15"));
        let count: usize = rollup.sections.iter().map(|s| s.items.len()).sum();
        assert_eq!(count, 3);
        assert!(rollup
            .sections
            .iter()
            .flat_map(|s| &s.items)
            .all(|i| i.project_type == Some(ProjectType::Idea)));
    }

    #[test]
    fn last_month_wraps_year() {
        let p = Period { year: 2023, month: 12 };
        assert_eq!(month_label(p, date("2024-01-05")), "Last month");
        assert_eq!(month_label(p, date("2024-02-05")), "Dec 2023");
    }

    #[test]
    fn percentages_clamp_and_empty_default() {
        use PhaseStatus::*;
        // 1/3 rounds to 33 three times, leaving 1 for empty.
        let p = PhaseProgress::of([Done, WorkingOnIt, Stuck]);
        assert_eq!((p.done_pct, p.working_on_it_pct, p.stuck_pct, p.empty_pct), (33, 33, 33, 1));

        // 2/3 + 1/6 + 1/6 rounds to 67 + 17 + 17 = 101.
        let p = PhaseProgress::of([Done, Done, Done, Done, WorkingOnIt, Stuck]);
        assert_eq!(p.empty_pct, 0);

        let p = PhaseProgress::of(Vec::<PhaseStatus>::new());
        assert_eq!(p.total, 0);
        assert_eq!(p.empty_pct, 100);
    }

    #[test]
    fn missing_start_column() {
        let s = RawSheet::from_text_rows("Projects", &["Description"], &[]);
        let err = import_projects(&s).unwrap_err();
        assert!(err.to_string().contains("'start_date'"));
    }
}
