use whdash_recon::config::ReportConfig;
use whdash_recon::model::{CellValue, Classification, KeyMode, RawSheet, ReportInput, ReportStatus};
use whdash_recon::{run, ReconError};

fn order_to_pack(extra: &str) -> ReportConfig {
    let toml = format!(
        r#"
name = "Order to Pack"

[source.primary]
file = "orders.xlsx"
sheet = "Orders"

[source.secondary]
file = "orders.xlsx"
sheet = "Packing"

[columns]
key = ["Order", "Order No"]
start = ["Created", "Created At"]
end = ["Packed", "Packed At"]
reason = ["Miss Reason"]

[columns.detail]
Warehouse = ["WH", "Warehouse"]

[threshold]
mode = "hours"
hours = 24
{extra}
"#
    );
    ReportConfig::from_toml(&toml).unwrap()
}

fn orders(rows: &[&[&str]]) -> RawSheet {
    RawSheet::from_text_rows(
        "Orders",
        &[" Order   No ", "Created At", "Miss Reason", "Warehouse"],
        rows,
    )
}

fn packing(rows: &[&[&str]]) -> RawSheet {
    RawSheet::from_text_rows("Packing", &["order", "Packed"], rows)
}

// -------------------------------------------------------------------------
// End-to-end scenario
// -------------------------------------------------------------------------

#[test]
fn canonical_join_example() {
    let config = order_to_pack("");
    let input = ReportInput {
        primary: orders(&[
            &["1", "2024-01-01T08:00", "", "WH1"],
            &["002", "2024-01-05T08:00", "Late truck", "WH2"],
        ]),
        secondary: Some(packing(&[
            &["001", "2024-01-01T09:00"],
            &["2", "2024-01-06T10:00"],
        ])),
    };
    let result = run(&config, &input).unwrap();

    assert_eq!(result.status, ReportStatus::Ready);
    assert_eq!(result.summary.join.mode, KeyMode::Canonical);
    assert_eq!(result.summary.hit, 1);
    assert_eq!(result.summary.miss, 1);
    assert_eq!(result.summary.hit_percentage, 50);

    let pivot = &result.pivot;
    assert_eq!(pivot.columns, vec!["Jan"]);
    assert_eq!(pivot.value("Total", "Jan"), Some(2));
    assert_eq!(pivot.value("Hit", "Jan"), Some(1));
    assert_eq!(pivot.value("Miss", "Jan"), Some(1));
    assert_eq!(pivot.value("Hit %", "Jan"), Some(50));
    assert_eq!(pivot.value("Late truck", "Jan"), Some(1));

    let detail = &result.detail;
    assert_eq!(detail.columns.last().map(String::as_str), Some("Warehouse"));
    assert_eq!(detail.rows[0][3], "1");
    assert_eq!(detail.rows[1][3], "26");
    assert_eq!(detail.rows[1][4], "Miss");
    assert_eq!(detail.filters["Result"], vec!["Hit", "Miss"]);

    assert_eq!(result.chart.labels, vec!["Jan"]);
    assert_eq!(result.chart.target, vec![95.0]);
}

#[test]
fn serial_dates_and_excel_cells() {
    let config = order_to_pack("");
    let mut primary = orders(&[&["7", "", "", ""]]);
    // 2024-01-01 12:00 as an Excel serial.
    primary.rows[0][1] = CellValue::Number(45292.5);
    let mut secondary = packing(&[&["7", ""]]);
    secondary.rows[0][1] = CellValue::DateTime(
        chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    );
    let input = ReportInput {
        primary,
        secondary: Some(secondary),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.summary.join.mode, KeyMode::Trimmed);
    assert_eq!(result.records[0].duration, Some(24.0));
    assert_eq!(result.records[0].classification, Classification::Hit);
}

#[test]
fn json_output_shape() {
    let config = order_to_pack("");
    let input = ReportInput {
        primary: orders(&[&["1", "2024-01-01T08:00", "", "WH1"]]),
        secondary: Some(packing(&[&["1", "2024-01-01T09:00"]])),
    };
    let result = run(&config, &input).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["summary"]["join"]["mode"], "trimmed");
    assert_eq!(json["meta"]["threshold"], "24h");
    assert!(json.get("records").is_none());
    assert_eq!(json["pivot"]["rows"][0]["label"], "Hit %");
}

// -------------------------------------------------------------------------
// Report options
// -------------------------------------------------------------------------

#[test]
fn requested_periods_and_year_filter() {
    let config = order_to_pack("[report]\nperiods = [\"Jan\", \"Feb\"]\nyear = 2024\n");
    let input = ReportInput {
        primary: orders(&[
            &["1", "2023-12-30T08:00", "", "WH1"],
            &["2", "2024-01-02T08:00", "", "WH1"],
        ]),
        secondary: Some(packing(&[
            &["1", "2023-12-30T09:00"],
            &["2", "2024-01-02T09:00"],
        ])),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.status, ReportStatus::Ready);
    assert_eq!(result.pivot.columns, vec!["Jan"]);
    assert_eq!(result.pivot.notices, vec!["No data for Feb"]);

    // Detail, filters and summary agree with the pivot's year.
    assert_eq!(result.detail.rows.len(), 1);
    assert_eq!(result.detail.rows[0][0], "2");
    assert_eq!(result.detail.filters["Period"], vec!["Jan"]);
    assert_eq!(result.summary.total_records, 1);
    assert_eq!(result.summary.hit, 1);
}

#[test]
fn year_with_no_rows_is_not_ready() {
    let config = order_to_pack("[report]\nyear = 2030\n");
    let input = ReportInput {
        primary: orders(&[&["1", "2024-01-02T08:00", "", "WH1"]]),
        secondary: Some(packing(&[&["1", "2024-01-02T09:00"]])),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.status, ReportStatus::NoMatchingRows);
    assert!(result.pivot.columns.is_empty());
    assert!(result.detail.rows.is_empty());
    assert!(result.chart.labels.is_empty());
    assert_eq!(result.summary.total_records, 0);
    // Join statistics still describe the source rows.
    assert_eq!(result.summary.join.matched_rows, 1);
}

#[test]
fn business_day_threshold() {
    let toml = r#"
name = "POD"
[source.primary]
file = "pod.csv"
[columns]
key = ["Shipment"]
start = ["Dispatched"]
end = ["POD"]
[threshold]
mode = "business_days"
days = 2
excluded_weekday = "Fri"
"#;
    let config = ReportConfig::from_toml(toml).unwrap();
    let input = ReportInput {
        // 2024-01-04 is a Thursday; 01-05 (Fri) is not counted.
        primary: RawSheet::from_text_rows(
            "pod",
            &["Shipment", "Dispatched", "POD"],
            &[
                &["S1", "2024-01-04", "2024-01-08"],
                &["S2", "2024-01-04", "2024-01-10"],
                &["S3", "2024-01-04", ""],
            ],
        ),
        secondary: None,
    };
    let result = run(&config, &input).unwrap();
    let classes: Vec<Classification> = result.records.iter().map(|r| r.classification).collect();
    assert_eq!(
        classes,
        vec![Classification::Hit, Classification::Miss, Classification::Pending]
    );
    assert_eq!(result.summary.pending, 1);
    assert_eq!(result.pivot.value("Total", "Jan"), Some(2));
}

// -------------------------------------------------------------------------
// Failures
// -------------------------------------------------------------------------

#[test]
fn missing_primary_columns_listed_together() {
    let config = order_to_pack("");
    let input = ReportInput {
        primary: RawSheet::from_text_rows("Orders", &["Something"], &[]),
        secondary: Some(packing(&[])),
    };
    match run(&config, &input) {
        Err(ReconError::MissingColumns { sheet, fields }) => {
            assert_eq!(sheet, "Orders");
            assert_eq!(fields, vec!["key", "start"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn empty_primary_is_not_an_error() {
    let config = order_to_pack("[report]\nperiods = [\"Mar\"]\n");
    let input = ReportInput {
        primary: orders(&[]),
        secondary: Some(packing(&[])),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.status, ReportStatus::EmptySource);
    assert!(result.pivot.columns.is_empty());
    assert_eq!(result.pivot.notices, vec!["No data for Mar"]);
    assert!(result.chart.labels.is_empty());
}
