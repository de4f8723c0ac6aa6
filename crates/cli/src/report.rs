//! `whdash report`: config-driven duration reports.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use whdash_io::export::write_report_xlsx;
use whdash_recon::config::{ReportConfig, SheetSource};
use whdash_recon::model::{RawSheet, ReportInput, ReportResult, ReportStatus, YEAR_TOTAL_LABEL};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_NO_ROWS};
use crate::{print_json, render_table, CliError};

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Run a report from a TOML config file
    #[command(after_help = "\
Examples:
  whdash report run order-to-pack.toml
  whdash report run order-to-pack.toml --json
  whdash report run order-to-pack.toml --output result.json --xlsx report.xlsx")]
    Run {
        /// Path to the report config (.toml)
        config: PathBuf,

        /// Output JSON to stdout instead of the pivot table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the report as an xlsx workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// Validate a report config without running
    #[command(after_help = "\
Examples:
  whdash report validate order-to-pack.toml")]
    Validate {
        /// Path to the report config (.toml)
        config: PathBuf,
    },
}

pub fn cmd_report(cmd: ReportCommands) -> Result<(), CliError> {
    match cmd {
        ReportCommands::Run { config, json, output, xlsx } => cmd_report_run(config, json, output, xlsx),
        ReportCommands::Validate { config } => cmd_report_validate(config),
    }
}

fn load_config(path: &Path) -> Result<ReportConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReportConfig::from_toml(&config_str).map_err(CliError::recon)
}

/// Load one configured sheet, resolving its file relative to `base_dir`.
fn load_source(base_dir: &Path, source: &SheetSource) -> Result<RawSheet, CliError> {
    let path = base_dir.join(&source.file);
    whdash_io::load_sheet(&path, source.sheet.as_deref()).map_err(CliError::load)
}

fn cmd_report_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    xlsx_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let primary = load_source(base_dir, &config.source.primary)?;
    let secondary = match config.source.secondary {
        Some(ref source) => Some(load_source(base_dir, source)?),
        None => None,
    };
    let input = ReportInput { primary, secondary };

    let result = whdash_recon::run(&config, &input).map_err(CliError::recon)?;

    if let Some(ref path) = output_file {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        std::fs::write(path, json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = xlsx_file {
        write_report_xlsx(&result, path).map_err(CliError::load)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        print_json(&result)?;
    } else {
        print!("{}", render_pivot(&result));
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} records, {} hit, {} miss, {} pending ({}% hit, target {}%)",
        result.meta.config_name,
        s.total_records,
        s.hit,
        s.miss,
        s.pending,
        s.hit_percentage,
        config.report.target_pct,
    );

    match result.status {
        ReportStatus::Ready => Ok(()),
        ReportStatus::EmptySource => Err(CliError::new(EXIT_NO_ROWS, "primary sheet has no data rows")),
        ReportStatus::NoMatchingRows => Err(CliError::new(EXIT_NO_ROWS, "no rows matched the filter")
            .with_hint("check [filter] values against the sheet")),
    }
}

fn render_pivot(result: &ReportResult) -> String {
    let pivot = &result.pivot;
    let mut header = vec!["KPI".to_string()];
    header.extend(pivot.columns.iter().cloned());
    header.push(YEAR_TOTAL_LABEL.to_string());

    let rows: Vec<Vec<String>> = pivot
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.label.clone()];
            cells.extend(row.values.iter().map(u64::to_string));
            cells.push(row.year_total.to_string());
            cells
        })
        .collect();

    let mut out = format!("{} ({})\n", result.meta.config_name, result.meta.threshold);
    out.push_str(&render_table(&header, &rows));
    for notice in &pivot.notices {
        out.push_str(notice);
        out.push('\n');
    }
    out
}

fn cmd_report_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let sources = if config.source.secondary.is_some() { 2 } else { 1 };
    eprintln!(
        "valid: \"{}\" ({} source{}, threshold {})",
        config.name,
        sources,
        if sources == 1 { "" } else { "s" },
        config.threshold
    );
    Ok(())
}
