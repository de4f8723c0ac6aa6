//! Clerk interview tracking and clerk detail (profile) sheets.
//!
//! Both sheets use short generic headers ("Name", "Date", "Details"), so
//! their alias tables match exactly and never by containment.

use chrono::NaiveDate;
use serde::Serialize;

use crate::alias::{AliasTable, Resolution};
use crate::error::ReconError;
use crate::import::{ensure_found, is_blank_row, require_any, text, Imported};
use crate::model::RawSheet;
use crate::normalize::parse_datetime;

pub const INTERVIEW_SHEET: &str = "Sheet1";
pub const DETAILS_SHEET: &str = "interview";

// ---------------------------------------------------------------------------
// Interviews
// ---------------------------------------------------------------------------

const F_NO: &str = "no";
const F_DEPT_NAME: &str = "dept_name_en";
const F_DATE: &str = "date";
const F_CLERK_NAME: &str = "clerk_name";
const F_MOBILE: &str = "mobile";
const F_COMPANY: &str = "company";
const F_BUSINESS: &str = "business";
const F_ACCOUNT: &str = "account";
const F_SYSTEM_USED: &str = "system_used";
const F_REPORT_USED: &str = "report_used";
const F_DETAILS: &str = "details";
const F_VISIT_REASONS: &str = "wh_visit_reasons";
const F_PHYSICAL_DEPENDENCY: &str = "physical_dependency";
const F_AUTOMATION_POTENTIAL: &str = "automation_potential";
const F_CT_SUITABILITY: &str = "ct_suitability";
const F_OPTIMIZATION_PLAN: &str = "optimization_plan";

const INTERVIEW_FIELDS: [&str; 16] = [
    F_NO,
    F_DEPT_NAME,
    F_DATE,
    F_CLERK_NAME,
    F_MOBILE,
    F_COMPANY,
    F_BUSINESS,
    F_ACCOUNT,
    F_SYSTEM_USED,
    F_REPORT_USED,
    F_DETAILS,
    F_VISIT_REASONS,
    F_PHYSICAL_DEPENDENCY,
    F_AUTOMATION_POTENTIAL,
    F_CT_SUITABILITY,
    F_OPTIMIZATION_PLAN,
];

/// One interview row. Text fields are `""` when the column is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClerkInterview {
    pub no: String,
    pub dept_name_en: String,
    pub date: Option<NaiveDate>,
    pub clerk_name: String,
    pub mobile: String,
    pub company: String,
    pub business: String,
    pub account: String,
    pub system_used: String,
    pub report_used: String,
    pub details: String,
    pub wh_visit_reasons: String,
    pub physical_dependency: String,
    pub automation_potential: String,
    pub ct_suitability: String,
    pub optimization_plan: String,
}

pub fn interview_aliases() -> AliasTable {
    AliasTable::new()
        .with(F_NO, &["NO", "#"])
        .with(F_DEPT_NAME, &["DEPT_NAME_EN", "Department"])
        .with(F_DATE, &["Date", "التاريخ"])
        .with(F_CLERK_NAME, &["Clerk Name", "Name"])
        .with(F_MOBILE, &["Mobile", "موبايل"])
        .with(F_COMPANY, &["Company"])
        .with(F_BUSINESS, &["Business", "Businees"])
        .with(F_ACCOUNT, &["Account"])
        .with(F_SYSTEM_USED, &["System Used"])
        .with(F_REPORT_USED, &["Report Used"])
        .with(F_DETAILS, &["Details"])
        .with(F_VISIT_REASONS, &["WH Visit Reasons", "WH Visit Resons"])
        .with(F_PHYSICAL_DEPENDENCY, &["Physical Dependency"])
        .with(F_AUTOMATION_POTENTIAL, &["Automation Potential"])
        .with(F_CT_SUITABILITY, &["CT Suitability", "CT Suitbility"])
        .with(F_OPTIMIZATION_PLAN, &["Optimization Plan"])
        .exact_only()
}

/// Import interview rows. At least one of NO, clerk name, DEPT_NAME_EN or
/// date must be a column; rows without a number, clerk or department are
/// skipped. Unreadable dates become `None`.
pub fn import_interviews(sheet: &RawSheet) -> Result<Imported<ClerkInterview>, ReconError> {
    let cols = require_any(
        &interview_aliases(),
        sheet,
        &INTERVIEW_FIELDS,
        &[F_NO, F_CLERK_NAME, F_DEPT_NAME, F_DATE],
    )?;

    let mut out = Imported::new(&sheet.name);
    for r in 0..sheet.row_count() {
        if is_blank_row(sheet, r) {
            continue;
        }
        let get = |field: &str| text(sheet, &cols, field, r);
        let (no, dept_name_en, clerk_name) = (get(F_NO), get(F_DEPT_NAME), get(F_CLERK_NAME));
        if no.is_empty() && dept_name_en.is_empty() && clerk_name.is_empty() {
            continue;
        }
        out.rows.push(ClerkInterview {
            no,
            dept_name_en,
            date: cell_date(sheet, &cols, F_DATE, r),
            clerk_name,
            mobile: get(F_MOBILE),
            company: get(F_COMPANY),
            business: get(F_BUSINESS),
            account: get(F_ACCOUNT),
            system_used: get(F_SYSTEM_USED),
            report_used: get(F_REPORT_USED),
            details: get(F_DETAILS),
            wh_visit_reasons: get(F_VISIT_REASONS),
            physical_dependency: get(F_PHYSICAL_DEPENDENCY),
            automation_potential: get(F_AUTOMATION_POTENTIAL),
            ct_suitability: get(F_CT_SUITABILITY),
            optimization_plan: get(F_OPTIMIZATION_PLAN),
        });
    }
    Ok(out.finish())
}

fn cell_date(sheet: &RawSheet, cols: &Resolution, field: &str, r: usize) -> Option<NaiveDate> {
    cols.index_of(field)
        .and_then(|c| parse_datetime(sheet.cell(r, c)))
        .map(|dt| dt.date())
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

const F_DEPARTMENT: &str = "department";
const F_INTERVIEW_DATE: &str = "interview_date";
const F_WORK_DETAILS: &str = "work_details";
const F_REPORTS_USED: &str = "reports_used";
const F_SYSTEM_BADGE: &str = "system_badge";

const DETAIL_FIELDS: [&str; 10] = [
    F_DEPT_NAME,
    F_DEPARTMENT,
    F_COMPANY,
    F_BUSINESS,
    F_ACCOUNT,
    F_MOBILE,
    F_INTERVIEW_DATE,
    F_WORK_DETAILS,
    F_REPORTS_USED,
    F_SYSTEM_BADGE,
];

/// One clerk profile, keyed by the person's display name (`DEPT_NAME_EN`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClerkDetail {
    pub dept_name_en: String,
    pub department: String,
    pub company: String,
    pub business: String,
    pub account: String,
    pub mobile: String,
    /// As written in the sheet.
    pub interview_date: String,
    pub work_details: String,
    pub reports_used: String,
    pub system_badge: String,
}

pub fn detail_aliases() -> AliasTable {
    AliasTable::new()
        .with(F_DEPT_NAME, &["DEPT_NAME_EN", "Name", "Person Name"])
        .with(F_DEPARTMENT, &["Department", "DEPT"])
        .with(F_COMPANY, &["Company"])
        .with(F_BUSINESS, &["Business"])
        .with(F_ACCOUNT, &["Account"])
        .with(F_MOBILE, &["Mobile", "Phone"])
        .with(F_INTERVIEW_DATE, &["Interview Date", "Date"])
        .with(F_WORK_DETAILS, &["Work Details", "Details", "Process Note"])
        .with(F_REPORTS_USED, &["Reports Used"])
        .with(F_SYSTEM_BADGE, &["System", "System Used", "Tag", "Badge"])
        .exact_only()
}

/// Import clerk profiles. `DEPT_NAME_EN` is required and rows without it
/// are skipped.
pub fn import_details(sheet: &RawSheet) -> Result<Imported<ClerkDetail>, ReconError> {
    let cols = detail_aliases().resolve_all(&sheet.headers, &DETAIL_FIELDS)?;
    ensure_found(sheet, &cols, &[F_DEPT_NAME])?;

    let mut out = Imported::new(&sheet.name);
    for r in 0..sheet.row_count() {
        let get = |field: &str| text(sheet, &cols, field, r);
        let dept_name_en = get(F_DEPT_NAME);
        if dept_name_en.is_empty() {
            continue;
        }
        out.rows.push(ClerkDetail {
            dept_name_en,
            department: get(F_DEPARTMENT),
            company: get(F_COMPANY),
            business: get(F_BUSINESS),
            account: get(F_ACCOUNT),
            mobile: get(F_MOBILE),
            interview_date: get(F_INTERVIEW_DATE),
            work_details: get(F_WORK_DETAILS),
            reports_used: get(F_REPORTS_USED),
            system_badge: get(F_SYSTEM_BADGE),
        });
    }
    Ok(out.finish())
}
