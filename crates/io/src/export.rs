// Report export to xlsx: Summary (pivot + notices), Detail, Chart

use std::path::Path;

use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet, XlsxError};
use whdash_recon::model::{PivotRowKind, ReportResult, YEAR_TOTAL_LABEL};

use crate::LoadError;

pub const SUMMARY_SHEET: &str = "Summary";
pub const DETAIL_SHEET: &str = "Detail";
pub const CHART_SHEET: &str = "Chart";

/// Write `result` as a three-sheet workbook.
pub fn write_report_xlsx(result: &ReportResult, path: &Path) -> Result<(), LoadError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    write_summary(workbook.add_worksheet(), result, &bold)?;
    write_detail(workbook.add_worksheet(), result, &bold)?;
    write_chart(workbook.add_worksheet(), result, &bold)?;

    workbook.save(path)?;
    log::info!("wrote report '{}' to {}", result.meta.config_name, path.display());
    Ok(())
}

fn write_summary(ws: &mut Worksheet, result: &ReportResult, bold: &Format) -> Result<(), XlsxError> {
    ws.set_name(SUMMARY_SHEET)?;
    ws.write_string_with_format(0, 0, &result.meta.config_name, bold)?;
    ws.write_string(1, 0, format!("Threshold: {}", result.meta.threshold))?;

    let pivot = &result.pivot;
    let header_row = 3;
    ws.write_string_with_format(header_row, 0, "KPI", bold)?;
    for (c, label) in pivot.columns.iter().enumerate() {
        ws.write_string_with_format(header_row, col(c + 1), label, bold)?;
    }
    let total_col = col(pivot.columns.len() + 1);
    ws.write_string_with_format(header_row, total_col, YEAR_TOTAL_LABEL, bold)?;

    for (r, row) in pivot.rows.iter().enumerate() {
        let out_row = header_row + 1 + r as u32;
        let label_format = match row.kind {
            PivotRowKind::HitPercentage | PivotRowKind::Total => bold.clone(),
            _ => Format::new(),
        };
        ws.write_string_with_format(out_row, 0, &row.label, &label_format)?;
        for (c, value) in row.values.iter().enumerate() {
            ws.write_number(out_row, col(c + 1), *value as f64)?;
        }
        ws.write_number_with_format(out_row, total_col, row.year_total as f64, &label_format)?;
    }

    let mut notice_row = header_row + pivot.rows.len() as u32 + 2;
    for notice in &pivot.notices {
        ws.write_string(notice_row, 0, notice)?;
        notice_row += 1;
    }

    ws.set_column_width(0, 24)?;
    ws.set_freeze_panes(header_row + 1, 1)?;
    Ok(())
}

fn write_detail(ws: &mut Worksheet, result: &ReportResult, bold: &Format) -> Result<(), XlsxError> {
    ws.set_name(DETAIL_SHEET)?;
    let detail = &result.detail;
    for (c, name) in detail.columns.iter().enumerate() {
        ws.write_string_with_format(0, col(c), name, bold)?;
    }
    for (r, row) in detail.rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                ws.write_string(r as u32 + 1, col(c), value)?;
            }
        }
    }
    if !detail.columns.is_empty() {
        ws.autofilter(0, 0, detail.rows.len() as u32, col(detail.columns.len() - 1))?;
        ws.set_freeze_panes(1, 0)?;
    }
    Ok(())
}

fn write_chart(ws: &mut Worksheet, result: &ReportResult, bold: &Format) -> Result<(), XlsxError> {
    ws.set_name(CHART_SHEET)?;
    let series = &result.chart;
    ws.write_string_with_format(0, 0, "Period", bold)?;
    ws.write_string_with_format(0, 1, "Hit %", bold)?;
    ws.write_string_with_format(0, 2, "Target", bold)?;
    for (i, label) in series.labels.iter().enumerate() {
        let r = i as u32 + 1;
        ws.write_string(r, 0, label)?;
        ws.write_number(r, 1, series.hit_percentage[i] as f64)?;
        ws.write_number(r, 2, series.target[i])?;
    }

    if series.labels.is_empty() {
        return Ok(());
    }
    let last = series.labels.len() as u32;
    let mut chart = Chart::new(ChartType::Line);
    chart.title().set_name("Hit % by period");
    chart
        .add_series()
        .set_name("Hit %")
        .set_categories((CHART_SHEET, 1, 0, last, 0))
        .set_values((CHART_SHEET, 1, 1, last, 1));
    chart
        .add_series()
        .set_name("Target")
        .set_categories((CHART_SHEET, 1, 0, last, 0))
        .set_values((CHART_SHEET, 1, 2, last, 2));
    ws.insert_chart(1, 4, &chart)?;
    Ok(())
}

fn col(c: usize) -> u16 {
    c.min(u16::MAX as usize) as u16
}
