//! Potential challenges sheet (`Date | Challenges | Status | Progress % | Solutions`).

use serde::Serialize;

use crate::alias::AliasTable;
use crate::error::ReconError;
use crate::import::{ensure_found, or_placeholder, text, Imported};
use crate::model::RawSheet;
use crate::normalize::{normalize_percent, normalize_status, TaskStatus};

const FIELD_DATE: &str = "date";
const FIELD_CHALLENGES: &str = "challenges";
const FIELD_STATUS: &str = "status";
const FIELD_PROGRESS: &str = "progress";
const FIELD_SOLUTIONS: &str = "solutions";

/// Sheet read when none is named; loaders fall back to the first sheet.
pub const DEFAULT_SHEET: &str = "Potential_Challenges";

/// Headers listed when the challenges column cannot be found.
pub const HEADER_PREVIEW: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Challenge {
    /// Kept as written; the sheet mixes dates with labels like "Q2".
    pub date: String,
    pub challenge: String,
    pub status: TaskStatus,
    pub progress_pct: u32,
    pub solutions: String,
}

pub fn challenge_aliases() -> AliasTable {
    AliasTable::new()
        .with(FIELD_DATE, &["Date"])
        .with(FIELD_CHALLENGES, &["Challenges", "Challenge"])
        .with(FIELD_STATUS, &["Status"])
        .with(FIELD_PROGRESS, &["Progress %", "Progress%", "Progress"])
        .with(FIELD_SOLUTIONS, &["Solutions", "Solution"])
}

/// Import challenge rows. Only the challenges column is required; rows with
/// neither a date nor a challenge are skipped.
pub fn import_challenges(sheet: &RawSheet) -> Result<Imported<Challenge>, ReconError> {
    let cols = challenge_aliases().resolve_all(
        &sheet.headers,
        &[FIELD_DATE, FIELD_CHALLENGES, FIELD_STATUS, FIELD_PROGRESS, FIELD_SOLUTIONS],
    )?;
    if let Err(e) = ensure_found(sheet, &cols, &[FIELD_CHALLENGES]) {
        log::warn!(
            "sheet '{}': no challenges column; available: {}",
            sheet.name,
            crate::import::header_preview(&sheet.headers, HEADER_PREVIEW).join(", ")
        );
        return Err(e);
    }

    let mut out = Imported::new(&sheet.name);
    for r in 0..sheet.row_count() {
        let date = text(sheet, &cols, FIELD_DATE, r);
        let challenge = text(sheet, &cols, FIELD_CHALLENGES, r);
        if date.is_empty() && challenge.is_empty() {
            continue;
        }
        out.rows.push(Challenge {
            date: or_placeholder(date),
            challenge: or_placeholder(challenge),
            status: normalize_status(&text(sheet, &cols, FIELD_STATUS, r)),
            progress_pct: cols
                .index_of(FIELD_PROGRESS)
                .map(|c| normalize_percent(sheet.cell(r, c)))
                .unwrap_or(0),
            solutions: or_placeholder(text(sheet, &cols, FIELD_SOLUTIONS, r)),
        });
    }
    Ok(out.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::PLACEHOLDER;
    use crate::model::CellValue;

    #[test]
    fn imports_challenges() {
        let mut sheet = RawSheet::from_text_rows(
            "Sheet1",
            &["Date", "Challenges", "Status", "Progress (%)", "Solutions"],
            &[
                &["2024-02-01", "Dock congestion", "In progress", "", "Slot bookings"],
                &["", "", "Done", "100", ""],
                &["Q2", "", "", "", ""],
            ],
        );
        sheet.rows[0][3] = CellValue::Number(0.3);

        let imported = import_challenges(&sheet).unwrap();
        assert!(imported.is_clean());
        assert_eq!(imported.rows.len(), 2);

        let first = &imported.rows[0];
        assert_eq!(first.challenge, "Dock congestion");
        assert_eq!(first.status, TaskStatus::InProgress);
        assert_eq!(first.progress_pct, 30);
        assert_eq!(first.solutions, "Slot bookings");

        let second = &imported.rows[1];
        assert_eq!(second.date, "Q2");
        assert_eq!(second.challenge, PLACEHOLDER);
        assert_eq!(second.status, TaskStatus::NotStarted);
        assert_eq!(second.solutions, PLACEHOLDER);
    }

    #[test]
    fn only_challenges_column_is_required() {
        let sheet = RawSheet::from_text_rows("Sheet1", &["challenge"], &[&["Label printer down"]]);
        let imported = import_challenges(&sheet).unwrap();
        assert_eq!(imported.rows[0].date, PLACEHOLDER);
        assert_eq!(imported.rows[0].progress_pct, 0);

        let sheet = RawSheet::from_text_rows("Sheet1", &["Date", "Owner"], &[]);
        let err = import_challenges(&sheet).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Sheet1': column not found for 'challenges'");
    }
}
