//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (unspecified)                       |
//! | 2    | CLI usage error (bad args)                        |
//! | 3    | Report config invalid (parse or validation)       |
//! | 4    | Input file or sheet not found / unreadable        |
//! | 5    | Required columns missing from a sheet             |
//! | 6    | No rows (empty sheet, or filter/year kept none)   |

use whdash_io::LoadError;
use whdash_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input workbook missing, unreadable, or of an unsupported type.
pub const EXIT_INPUT_NOT_FOUND: u8 = 4;

/// One or more required logical columns did not resolve.
pub const EXIT_MISSING_COLUMNS: u8 = 5;

/// The report ran but had no rows to aggregate.
pub const EXIT_NO_ROWS: u8 = 6;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::MissingColumns { .. } | ReconError::NoneOfColumns { .. } => EXIT_MISSING_COLUMNS,
        ReconError::UnknownField(_) => EXIT_ERROR,
    }
}

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::FileNotFound(_)
        | LoadError::SheetNotFound { .. }
        | LoadError::UnsupportedFormat(_)
        | LoadError::Workbook(_)
        | LoadError::Csv(_)
        | LoadError::Io(_) => EXIT_INPUT_NOT_FOUND,
        LoadError::Export(_) => EXIT_ERROR,
    }
}
