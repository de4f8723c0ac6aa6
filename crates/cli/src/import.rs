//! `whdash import`: challenges, quick wins, clerk and staff sheets.
//!
//! Each command prints the accepted rows as a table (or the full import as
//! JSON). Rejected rows go to stderr as `Row N: ...` and do not change the
//! exit code.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use whdash_recon::import::header_preview;
use whdash_recon::model::RawSheet;
use whdash_recon::normalize::TaskStatus;
use whdash_recon::{challenges, clerks, quick_wins, workforce, Imported};

use crate::exit_codes::EXIT_NO_ROWS;
use crate::{print_json, render_table, CliError};

#[derive(Args)]
pub struct SheetArgs {
    /// Workbook or CSV file
    file: PathBuf,

    /// Sheet name (falls back to the first sheet when absent)
    #[arg(long)]
    sheet: Option<String>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Potential challenges (Date | Challenges | Status | Progress % | Solutions)
    #[command(after_help = "\
Examples:
  whdash import challenges Potential_Challenges.xlsx
  whdash import challenges challenges.csv --json")]
    Challenges(SheetArgs),

    /// Quick-wins progress status (Clerk | Account | Remark | Status)
    #[command(after_help = "\
Examples:
  whdash import quick-wins Quick_wins.xlsx")]
    QuickWins(SheetArgs),

    /// Clerk interview tracking (NO | DEPT_NAME_EN | Date | Clerk Name | ...)
    Interviews(SheetArgs),

    /// Clerk detail profiles keyed by DEPT_NAME_EN
    #[command(after_help = "\
Examples:
  whdash import clerks Clerk_details.xlsx --sheet interview")]
    Clerks(SheetArgs),

    /// Warehouse staff roster (WH | Emp No | Full Name | Business | Business 2)
    #[command(after_help = "\
Examples:
  whdash import staff WH_data.xlsx
  whdash import staff WH_data.xlsx --json")]
    Staff(SheetArgs),
}

pub fn cmd_import(cmd: ImportCommands) -> Result<(), CliError> {
    match cmd {
        ImportCommands::Challenges(args) => cmd_challenges(args),
        ImportCommands::QuickWins(args) => cmd_quick_wins(args),
        ImportCommands::Interviews(args) => cmd_interviews(args),
        ImportCommands::Clerks(args) => cmd_clerks(args),
        ImportCommands::Staff(args) => cmd_staff(args),
    }
}

/// Load the requested sheet; an empty sheet is reported, not imported.
fn load(args: &SheetArgs, default_sheet: &str) -> Result<RawSheet, CliError> {
    let name = args.sheet.as_deref().unwrap_or(default_sheet);
    let loaded = whdash_io::load_sheet(&args.file, Some(name)).map_err(CliError::load)?;
    if loaded.is_empty() {
        return Err(CliError::new(
            EXIT_NO_ROWS,
            format!("{}: sheet '{}' is empty", args.file.display(), loaded.name),
        ));
    }
    Ok(loaded)
}

fn print_rows<T>(
    imported: &Imported<T>,
    header: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) {
    let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = imported.rows.iter().map(row).collect();
    print!("{}", render_table(&header, &rows));
}

fn report_issues<T>(imported: &Imported<T>) {
    for issue in &imported.issues {
        eprintln!("{issue}");
    }
    eprintln!(
        "sheet '{}': {} rows imported, {} rejected",
        imported.sheet,
        imported.rows.len(),
        imported.issues.len()
    );
}

fn cmd_challenges(args: SheetArgs) -> Result<(), CliError> {
    let loaded = load(&args, challenges::DEFAULT_SHEET)?;
    let imported = challenges::import_challenges(&loaded).map_err(|e| {
        let preview = header_preview(&loaded.headers, challenges::HEADER_PREVIEW);
        CliError::recon_listing(e, "challenges", &preview)
    })?;
    if args.json {
        return print_json(&imported);
    }
    print_rows(
        &imported,
        &["Date", "Challenge", "Status", "Progress %", "Solutions"],
        |c| {
            vec![
                c.date.clone(),
                c.challenge.clone(),
                c.status.to_string(),
                c.progress_pct.to_string(),
                c.solutions.clone(),
            ]
        },
    );
    report_issues(&imported);
    Ok(())
}

fn cmd_quick_wins(args: SheetArgs) -> Result<(), CliError> {
    let loaded = load(&args, quick_wins::DEFAULT_SHEET)?;
    let imported = quick_wins::import_quick_wins(&loaded).map_err(CliError::recon)?;
    if args.json {
        return print_json(&imported);
    }
    print_rows(&imported, &["Clerk", "Account", "Status", "Remark"], |q| {
        vec![
            q.clerk.clone(),
            q.account.clone(),
            q.status.to_string(),
            q.remark.clone(),
        ]
    });
    let counts = quick_wins::status_counts(&imported.rows);
    let done = counts.get(&TaskStatus::Completed).copied().unwrap_or(0);
    eprintln!("{done} of {} quick wins completed", imported.rows.len());
    report_issues(&imported);
    Ok(())
}

fn cmd_interviews(args: SheetArgs) -> Result<(), CliError> {
    let loaded = load(&args, clerks::INTERVIEW_SHEET)?;
    let imported = clerks::import_interviews(&loaded).map_err(CliError::recon)?;
    if args.json {
        return print_json(&imported);
    }
    print_rows(&imported, &["NO", "Clerk", "Date", "Business", "Account"], |i| {
        vec![
            i.no.clone(),
            if i.clerk_name.is_empty() {
                i.dept_name_en.clone()
            } else {
                i.clerk_name.clone()
            },
            i.date.map(|d| d.to_string()).unwrap_or_default(),
            i.business.clone(),
            i.account.clone(),
        ]
    });
    report_issues(&imported);
    Ok(())
}

fn cmd_clerks(args: SheetArgs) -> Result<(), CliError> {
    let loaded = load(&args, clerks::DETAILS_SHEET)?;
    let imported = clerks::import_details(&loaded).map_err(CliError::recon)?;
    if args.json {
        return print_json(&imported);
    }
    print_rows(&imported, &["Name", "Department", "Business", "System"], |d| {
        vec![
            d.dept_name_en.clone(),
            d.department.clone(),
            d.business.clone(),
            d.system_badge.clone(),
        ]
    });
    report_issues(&imported);
    Ok(())
}

#[derive(Serialize)]
struct StaffOutput<'a> {
    #[serde(flatten)]
    imported: &'a Imported<workforce::StaffRow>,
    business_units: Vec<String>,
}

fn cmd_staff(args: SheetArgs) -> Result<(), CliError> {
    let loaded = load(&args, workforce::DEFAULT_SHEET)?;
    let imported = workforce::import_staff(&loaded).map_err(CliError::recon)?;
    let business_units = workforce::business_units(&imported.rows);
    if args.json {
        return print_json(&StaffOutput {
            imported: &imported,
            business_units,
        });
    }
    print_rows(
        &imported,
        &["WH", "Emp No", "Full Name", "Business", "Business 2"],
        |s| {
            vec![
                s.wh.clone(),
                s.emp_no.clone(),
                s.full_name.clone(),
                s.business.clone(),
                s.business_2.clone().unwrap_or_default(),
            ]
        },
    );
    eprintln!("business units: {}", business_units.join(", "));
    report_issues(&imported);
    Ok(())
}
