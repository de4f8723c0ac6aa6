//! Quick-wins progress status sheet (`Clerk | Account | Remark | Status`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alias::AliasTable;
use crate::error::ReconError;
use crate::import::{count_statuses, is_blank_row, require_any, text, Imported};
use crate::model::RawSheet;
use crate::normalize::{normalize_status, TaskStatus};

const FIELD_CLERK: &str = "clerk";
const FIELD_ACCOUNT: &str = "account";
const FIELD_REMARK: &str = "remark";
const FIELD_STATUS: &str = "status";

pub const DEFAULT_SHEET: &str = "Sheet1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickWin {
    pub clerk: String,
    pub account: String,
    pub remark: String,
    pub status: TaskStatus,
}

pub fn quick_win_aliases() -> AliasTable {
    AliasTable::new()
        .with(FIELD_CLERK, &["Clerk"])
        .with(FIELD_ACCOUNT, &["Account", "Accunt"])
        .with(FIELD_REMARK, &["Remark", "Remarks"])
        .with(FIELD_STATUS, &["Status"])
}

/// Import quick-win rows. Clerk or account must be present as a column, and
/// rows carrying neither are skipped.
pub fn import_quick_wins(sheet: &RawSheet) -> Result<Imported<QuickWin>, ReconError> {
    let cols = require_any(
        &quick_win_aliases(),
        sheet,
        &[FIELD_CLERK, FIELD_ACCOUNT, FIELD_REMARK, FIELD_STATUS],
        &[FIELD_CLERK, FIELD_ACCOUNT],
    )?;

    let mut out = Imported::new(&sheet.name);
    for r in 0..sheet.row_count() {
        if is_blank_row(sheet, r) {
            continue;
        }
        let clerk = text(sheet, &cols, FIELD_CLERK, r);
        let account = text(sheet, &cols, FIELD_ACCOUNT, r);
        if clerk.is_empty() && account.is_empty() {
            continue;
        }
        out.rows.push(QuickWin {
            clerk,
            account,
            remark: text(sheet, &cols, FIELD_REMARK, r),
            status: normalize_status(&text(sheet, &cols, FIELD_STATUS, r)),
        });
    }
    Ok(out.finish())
}

pub fn status_counts(rows: &[QuickWin]) -> BTreeMap<TaskStatus, usize> {
    count_statuses(rows.iter().map(|r| r.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_rows_with_clerk_or_account() {
        let sheet = RawSheet::from_text_rows(
            "Sheet1",
            &["Clerk", "Accunt", "Remarks", "Status"],
            &[
                &["Sara", "Retail", "Shared report", "Completed"],
                &["", "Pharma", "", "in progress"],
                &["", "", "orphan remark", "Done"],
                &["", "", "", ""],
            ],
        );
        let imported = import_quick_wins(&sheet).unwrap();
        assert_eq!(imported.rows.len(), 2);
        assert_eq!(imported.rows[0].remark, "Shared report");
        assert_eq!(imported.rows[1].clerk, "");
        assert_eq!(imported.rows[1].account, "Pharma");

        let counts = status_counts(&imported.rows);
        assert_eq!(counts[&TaskStatus::Completed], 1);
        assert_eq!(counts[&TaskStatus::InProgress], 1);
    }

    #[test]
    fn account_alone_is_enough() {
        let sheet = RawSheet::from_text_rows("Sheet1", &["Account"], &[&["FMCG"]]);
        let imported = import_quick_wins(&sheet).unwrap();
        assert_eq!(imported.rows[0].status, TaskStatus::NotStarted);
    }

    #[test]
    fn needs_clerk_or_account_column() {
        let sheet = RawSheet::from_text_rows("Sheet1", &["Remark", "Status"], &[&["x", "Done"]]);
        let err = import_quick_wins(&sheet).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Sheet1': need at least one of 'clerk', 'account'");
    }
}
