//! `whdash-recon`: spreadsheet-to-report reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded sheets, returns pivot, detail and
//! chart structures ready for rendering. The tracker and roster importers
//! (`tracker`, `project`, `challenges`, `quick_wins`, `clerks`, `workforce`)
//! share the same alias resolution. No CLI or IO dependencies.

pub mod aggregate;
pub mod alias;
pub mod challenges;
pub mod classify;
pub mod clerks;
pub mod config;
pub mod detail;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod import;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod project;
pub mod quick_wins;
pub mod tracker;
pub mod workforce;

pub use alias::{resolve_column, AliasTable, ColumnAlias};
pub use classify::{classify, Threshold};
pub use config::ReportConfig;
pub use engine::run;
pub use error::ReconError;
pub use import::{Imported, RowIssue};
pub use model::{CellValue, Classification, RawSheet, ReportInput, ReportResult};
