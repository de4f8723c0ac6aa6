// whdash CLI - warehouse KPI reports from spreadsheet exports

mod exit_codes;
mod import;
mod inspect;
mod report;
mod tracker;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{load_exit_code, recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use whdash_io::LoadError;
use whdash_recon::ReconError;

#[derive(Parser)]
#[command(name = "whdash")]
#[command(about = "Warehouse KPI reports from spreadsheet exports")]
#[command(version)]
#[command(long_version = LONG_VERSION)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Duration reports (Hit/Miss by period) from a TOML config
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// List the header row of a sheet
    #[command(after_help = "\
Examples:
  whdash columns orders.xlsx
  whdash columns orders.xlsx --sheet Packing --json")]
    Columns {
        /// Workbook or CSV file
        file: PathBuf,

        /// Sheet name (workbooks only; falls back to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Output JSON instead of one header per line
        #[arg(long)]
        json: bool,
    },

    /// Weekly and project tracker imports
    #[command(subcommand)]
    Tracker(tracker::TrackerCommands),

    /// Challenge, quick-win, clerk and staff sheet imports
    #[command(subcommand)]
    Import(import::ImportCommands),
}

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("WHDASH_GIT_HASH"), ")");

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report(cmd) => report::cmd_report(cmd),
        Commands::Columns { file, sheet, json } => inspect::cmd_columns(file, sheet, json),
        Commands::Tracker(cmd) => tracker::cmd_tracker(cmd),
        Commands::Import(cmd) => import::cmd_import(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumns { .. } | ReconError::NoneOfColumns { .. } => {
                Some("run `whdash columns <file>` to see the headers that were found".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::FileNotFound(_) => {
                Some("paths in a report config are relative to the config file".to_string())
            }
            _ => None,
        };
        Self { code: load_exit_code(&err), message: err.to_string(), hint }
    }

    /// Like [`recon`](Self::recon), but when `field` is one of the missing
    /// columns the hint lists `headers` instead.
    pub fn recon_listing(err: ReconError, field: &str, headers: &[String]) -> Self {
        let listed = matches!(&err, ReconError::MissingColumns { fields, .. } if fields.iter().any(|f| f == field));
        let out = Self::recon(err);
        if listed {
            out.with_hint(format!("available columns: {}", headers.join(", ")))
        } else {
            out
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Pretty JSON to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Left-aligned text table (first column) with right-aligned values.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let cols = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let mut out = String::new();
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if i > 0 {
                out.push_str("  ");
            }
            if i == 0 {
                out.push_str(&format!("{cell:<w$}"));
            } else {
                out.push_str(&format!("{cell:>w$}"));
            }
        }
        out.trim_end().to_string()
    };

    let mut out = line(header);
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}
