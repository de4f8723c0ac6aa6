//! `whdash tracker`: weekly tracker and project tracker imports.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use whdash_recon::project::{import_projects, rollup, PhaseProgress, ProjectType};
use whdash_recon::tracker::{header_preview, import_weekly};

use crate::{print_json, render_table, CliError};

/// Sheet read by `tracker weekly` when `--sheet` is not given.
const WEEKLY_SHEET: &str = "Weekly Tracker";

#[derive(Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Idea,
    Automation,
}

impl From<TypeArg> for ProjectType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Idea => ProjectType::Idea,
            TypeArg::Automation => ProjectType::Automation,
        }
    }
}

#[derive(Subcommand)]
pub enum TrackerCommands {
    /// Import a weekly tracker (Week | Task | Status | Progress % | Impact)
    #[command(after_help = "\
Examples:
  whdash tracker weekly Weekly_Project_Tracker.xlsx
  whdash tracker weekly tracker.csv --json")]
    Weekly {
        file: PathBuf,

        /// Sheet name (default: \"Weekly Tracker\", falling back to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Roll up a project tracker by start month with phase progress
    #[command(after_help = "\
Examples:
  whdash tracker projects projects.xlsx
  whdash tracker projects projects.xlsx --type idea --today 2024-03-15 --json")]
    Projects {
        file: PathBuf,

        #[arg(long)]
        sheet: Option<String>,

        /// Only include projects of this type
        #[arg(long = "type", value_enum)]
        project_type: Option<TypeArg>,

        /// Reference date for "This month" / "Last month" (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_tracker(cmd: TrackerCommands) -> Result<(), CliError> {
    match cmd {
        TrackerCommands::Weekly { file, sheet, json } => cmd_weekly(file, sheet, json),
        TrackerCommands::Projects { file, sheet, project_type, today, json } => {
            cmd_projects(file, sheet, project_type, today, json)
        }
    }
}

fn cmd_weekly(file: PathBuf, sheet: Option<String>, json: bool) -> Result<(), CliError> {
    let sheet_name = sheet.as_deref().unwrap_or(WEEKLY_SHEET);
    let loaded = whdash_io::load_sheet(&file, Some(sheet_name)).map_err(CliError::load)?;

    let tracker = import_weekly(&loaded)
        .map_err(|e| CliError::recon_listing(e, "progress", &header_preview(&loaded.headers)))?;

    if json {
        return print_json(&tracker);
    }

    let header: Vec<String> = ["Week", "Task", "Status", "Progress %", "Impact"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = tracker
        .rows
        .iter()
        .map(|r| {
            vec![
                r.week.clone(),
                r.task.clone(),
                r.status.to_string(),
                r.progress_pct.to_string(),
                r.impact.clone(),
            ]
        })
        .collect();
    print!("{}", render_table(&header, &rows));

    let s = &tracker.summary;
    let statuses: Vec<String> = s.by_status.iter().map(|(k, v)| format!("{v} {k}")).collect();
    eprintln!(
        "{} rows ({}), mean progress {}%",
        s.rows,
        statuses.join(", "),
        s.mean_progress
    );
    Ok(())
}

fn cmd_projects(
    file: PathBuf,
    sheet: Option<String>,
    project_type: Option<TypeArg>,
    today: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let today = match today {
        Some(ref s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| CliError::args(format!("invalid --today '{s}'")).with_hint("use YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };

    let loaded = whdash_io::load_sheet(&file, sheet.as_deref()).map_err(CliError::load)?;
    let items = import_projects(&loaded).map_err(CliError::recon)?;
    let result = rollup(&items, project_type.map(ProjectType::from), today);

    if json {
        return print_json(&result);
    }

    for section in &result.sections {
        println!("{} ({} projects)", section.label, section.items.len());
        let p = &section.progress;
        for (name, phase) in [
            ("Brainstorming", &p.brainstorming),
            ("Execution", &p.execution),
            ("Launch", &p.launch),
        ] {
            println!("  {name:<14} {}", phase_line(phase));
        }
        for item in &section.items {
            println!(
                "  - {} [{}] {}",
                item.description,
                item.start_date.format("%b %d"),
                item.person
            );
        }
    }
    Ok(())
}

fn phase_line(p: &PhaseProgress) -> String {
    format!(
        "done {}%  working {}%  stuck {}%  empty {}%",
        p.done_pct, p.working_on_it_pct, p.stuck_pct, p.empty_pct
    )
}
