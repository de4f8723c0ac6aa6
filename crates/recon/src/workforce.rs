//! Warehouse staff roster (`WH | Emp No | Full Name | Business | Business 2`).

use serde::Serialize;

use crate::alias::AliasTable;
use crate::error::ReconError;
use crate::import::{ensure_found, or_placeholder, text, Imported, RowIssue};
use crate::model::RawSheet;

const FIELD_WH: &str = "wh";
const FIELD_EMP_NO: &str = "emp_no";
const FIELD_FULL_NAME: &str = "full_name";
const FIELD_BUSINESS: &str = "business";
const FIELD_BUSINESS_2: &str = "business_2";

pub const DEFAULT_SHEET: &str = "part_2";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffRow {
    pub wh: String,
    pub emp_no: String,
    pub full_name: String,
    pub business: String,
    pub business_2: Option<String>,
}

pub fn staff_aliases() -> AliasTable {
    AliasTable::new()
        .with(FIELD_WH, &["WH"])
        .with(FIELD_EMP_NO, &["Emp No", "Emp No."])
        .with(FIELD_FULL_NAME, &["Full Name"])
        .with(FIELD_BUSINESS, &["Busines", "Business"])
        .with(FIELD_BUSINESS_2, &["Business 2"])
        .exact_only()
}

/// Import roster rows. WH, Emp No, Full Name and Business columns are all
/// required. A row that names a person but no business is rejected with a
/// [`RowIssue`].
pub fn import_staff(sheet: &RawSheet) -> Result<Imported<StaffRow>, ReconError> {
    let required = [FIELD_WH, FIELD_EMP_NO, FIELD_FULL_NAME, FIELD_BUSINESS];
    let cols = staff_aliases().resolve_all(
        &sheet.headers,
        &[FIELD_WH, FIELD_EMP_NO, FIELD_FULL_NAME, FIELD_BUSINESS, FIELD_BUSINESS_2],
    )?;
    ensure_found(sheet, &cols, &required)?;

    let mut out = Imported::new(&sheet.name);
    for r in 0..sheet.row_count() {
        let wh = text(sheet, &cols, FIELD_WH, r);
        let emp_no = text(sheet, &cols, FIELD_EMP_NO, r);
        let full_name = text(sheet, &cols, FIELD_FULL_NAME, r);
        if wh.is_empty() && emp_no.is_empty() && full_name.is_empty() {
            continue;
        }

        let business = text(sheet, &cols, FIELD_BUSINESS, r);
        if business.is_empty() {
            out.issues.push(RowIssue::new(r, "Business is required."));
            continue;
        }
        let business_2 = Some(text(sheet, &cols, FIELD_BUSINESS_2, r)).filter(|b| !b.is_empty());

        out.rows.push(StaffRow {
            wh: or_placeholder(wh),
            emp_no: or_placeholder(emp_no),
            full_name: or_placeholder(full_name),
            business,
            business_2,
        });
    }
    Ok(out.finish())
}

/// Distinct business units named by `rows`, in first-seen order.
pub fn business_units(rows: &[StaffRow]) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let names = rows
        .iter()
        .flat_map(|r| std::iter::once(&r.business).chain(r.business_2.as_ref()));
    for name in names {
        if !units.contains(name) {
            units.push(name.clone());
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::PLACEHOLDER;
    use crate::model::CellValue;

    fn roster() -> RawSheet {
        let mut sheet = RawSheet::from_text_rows(
            "part_2",
            &["WH", "Emp No.", "Full Name", "Busines", "Business 2"],
            &[
                &["RUH1", "", "Sara Ahmed", "Retail", ""],
                &["RUH1", "1002", "Omar Ali", "", "Pharma"],
                &["", "", "", "Retail", ""],
                &["", "1003", "", "Pharma", "Retail"],
            ],
        );
        sheet.rows[0][1] = CellValue::Number(1001.0);
        sheet
    }

    #[test]
    fn rows_without_business_are_reported() {
        let imported = import_staff(&roster()).unwrap();
        assert_eq!(imported.rows.len(), 2);
        assert_eq!(imported.rows[0].emp_no, "1001");
        assert_eq!(imported.rows[0].business_2, None);

        assert_eq!(imported.issues, vec![RowIssue::new(1, "Business is required.")]);
        assert_eq!(imported.issues[0].to_string(), "Row 3: Business is required.");

        let last = &imported.rows[1];
        assert_eq!(last.wh, PLACEHOLDER);
        assert_eq!(last.full_name, PLACEHOLDER);
        assert_eq!(last.business_2.as_deref(), Some("Retail"));
    }

    #[test]
    fn business_units_in_first_seen_order() {
        let imported = import_staff(&roster()).unwrap();
        assert_eq!(business_units(&imported.rows), vec!["Retail", "Pharma"]);
    }

    #[test]
    fn all_required_columns_reported() {
        let sheet = RawSheet::from_text_rows("part_2", &["WH", "Name", "Business Unit"], &[]);
        let err = import_staff(&sheet).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sheet 'part_2': column not found for 'emp_no', 'full_name', 'business'"
        );
    }
}
