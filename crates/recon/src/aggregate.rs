use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{
    Classification, JoinedRecord, Period, PeriodSummary, PivotRow, PivotRowKind, PivotTable,
};

pub const ROW_HIT_PCT: &str = "Hit %";
pub const ROW_HIT: &str = "Hit";
pub const ROW_MISS: &str = "Miss";
pub const ROW_TOTAL: &str = "Total";

#[derive(Default)]
struct PeriodAcc {
    keys: HashSet<String>,
    unique: usize,
    hit: usize,
    miss: usize,
    reasons: BTreeMap<String, u64>,
}

/// Round(100 * part / whole), 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (100.0 * part as f64 / whole as f64).round() as u32
    }
}

/// Group records by calendar month. A key repeated within one month counts
/// once (first seen). Records without any usable date, or outside `year`,
/// are left out.
fn group_by_period(records: &[JoinedRecord], year: Option<i32>) -> BTreeMap<Period, PeriodAcc> {
    let mut groups: BTreeMap<Period, PeriodAcc> = BTreeMap::new();

    for record in records {
        let Some(date) = record.period_date() else {
            continue;
        };
        let period = Period::of(date);
        if year.is_some_and(|y| y != period.year) {
            continue;
        }

        let acc = groups.entry(period).or_default();
        if !record.key.is_empty() && !acc.keys.insert(record.key.clone()) {
            continue;
        }
        acc.unique += 1;

        match record.classification {
            Classification::Hit => acc.hit += 1,
            Classification::Miss => {
                acc.miss += 1;
                if !record.reason.is_empty() {
                    *acc.reasons.entry(record.reason.clone()).or_insert(0) += 1;
                }
            }
            Classification::Pending => {}
        }
    }

    groups
}

fn spans_years(groups: &BTreeMap<Period, PeriodAcc>) -> bool {
    let years: BTreeSet<i32> = groups.keys().map(|p| p.year).collect();
    years.len() > 1
}

/// Per-month Hit/Miss counts, chronologically.
pub fn summarize_periods(records: &[JoinedRecord], year: Option<i32>) -> Vec<PeriodSummary> {
    let groups = group_by_period(records, year);
    summaries(&groups)
}

fn summaries(groups: &BTreeMap<Period, PeriodAcc>) -> Vec<PeriodSummary> {
    let with_year = spans_years(groups);
    groups
        .iter()
        .map(|(period, acc)| {
            let total = acc.hit + acc.miss;
            PeriodSummary {
                period: *period,
                label: period.label(with_year),
                unique_keys: acc.unique,
                total_count: total,
                hit_count: acc.hit,
                miss_count: acc.miss,
                hit_percentage: percentage(acc.hit, total),
            }
        })
        .collect()
}

/// Build the month-by-KPI pivot.
///
/// Rows: `Hit %`, `Hit`, `Miss`, one row per miss reason, `Total`. Each
/// requested month with no rows gets a notice instead of a column.
pub fn build_pivot(
    records: &[JoinedRecord],
    year: Option<i32>,
    requested_months: &[u32],
) -> (Vec<PeriodSummary>, PivotTable) {
    let groups = group_by_period(records, year);
    let periods = summaries(&groups);

    let columns: Vec<String> = periods.iter().map(|p| p.label.clone()).collect();

    let hit: Vec<u64> = periods.iter().map(|p| p.hit_count as u64).collect();
    let miss: Vec<u64> = periods.iter().map(|p| p.miss_count as u64).collect();
    let total: Vec<u64> = periods.iter().map(|p| p.total_count as u64).collect();
    let pct: Vec<u64> = periods.iter().map(|p| p.hit_percentage as u64).collect();

    let hit_sum: u64 = hit.iter().sum();
    let miss_sum: u64 = miss.iter().sum();
    let total_sum: u64 = total.iter().sum();

    let mut rows = vec![
        PivotRow {
            label: ROW_HIT_PCT.into(),
            kind: PivotRowKind::HitPercentage,
            values: pct,
            year_total: percentage(hit_sum as usize, total_sum as usize) as u64,
        },
        PivotRow {
            label: ROW_HIT.into(),
            kind: PivotRowKind::Hit,
            values: hit,
            year_total: hit_sum,
        },
        PivotRow {
            label: ROW_MISS.into(),
            kind: PivotRowKind::Miss,
            values: miss,
            year_total: miss_sum,
        },
    ];

    let reasons: BTreeSet<&String> = groups.values().flat_map(|acc| acc.reasons.keys()).collect();
    for reason in reasons {
        let values: Vec<u64> = groups
            .values()
            .map(|acc| acc.reasons.get(reason).copied().unwrap_or(0))
            .collect();
        let year_total = values.iter().sum();
        rows.push(PivotRow {
            label: reason.clone(),
            kind: PivotRowKind::Reason,
            values,
            year_total,
        });
    }

    rows.push(PivotRow {
        label: ROW_TOTAL.into(),
        kind: PivotRowKind::Total,
        values: total,
        year_total: total_sum,
    });

    let notices = requested_months
        .iter()
        .filter(|m| (1..=12).contains(*m) && !groups.keys().any(|p| p.month == **m))
        .map(|m| format!("No data for {}", Period { year: 0, month: *m }.abbr()))
        .collect();

    (
        periods,
        PivotTable {
            columns,
            rows,
            notices,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use proptest::prelude::*;

    fn rec(key: &str, start: Option<&str>, class: Classification, reason: &str) -> JoinedRecord {
        JoinedRecord {
            key: key.into(),
            start: start.map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()),
            end: None,
            fallback_date: None,
            reason: reason.into(),
            classification: class,
            duration: None,
            extra: Vec::new(),
        }
    }

    use Classification::{Hit, Miss, Pending};

    #[test]
    fn january_hit_and_miss() {
        let records = vec![
            rec("1", Some("2024-01-01T08:00"), Hit, ""),
            rec("2", Some("2024-01-05T08:00"), Miss, ""),
        ];
        let (periods, pivot) = build_pivot(&records, None, &[]);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].label, "Jan");
        assert_eq!(periods[0].total_count, 2);
        assert_eq!(periods[0].hit_percentage, 50);

        assert_eq!(pivot.columns, vec!["Jan"]);
        assert_eq!(pivot.value("Total", "Jan"), Some(2));
        assert_eq!(pivot.value("Hit", "Jan"), Some(1));
        assert_eq!(pivot.value("Miss", "Jan"), Some(1));
        assert_eq!(pivot.value("Hit %", "Jan"), Some(50));
    }

    #[test]
    fn row_order_and_reason_rows() {
        let records = vec![
            rec("1", Some("2024-01-02T08:00"), Miss, "Late truck"),
            rec("2", Some("2024-01-03T08:00"), Miss, "Stock out"),
            rec("3", Some("2024-02-03T08:00"), Miss, "Late truck"),
            rec("4", Some("2024-02-04T08:00"), Hit, ""),
        ];
        let (_, pivot) = build_pivot(&records, None, &[]);
        let labels: Vec<&str> = pivot.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Hit %", "Hit", "Miss", "Late truck", "Stock out", "Total"]);

        let late = pivot.row("Late truck").unwrap();
        assert_eq!(late.values, vec![1, 1]);
        assert_eq!(late.year_total, 2);
        assert_eq!(pivot.row("Stock out").unwrap().values, vec![1, 0]);

        let pct = pivot.row("Hit %").unwrap();
        assert_eq!(pct.values, vec![0, 50]);
        assert_eq!(pct.year_total, 25);
        assert_eq!(pivot.row("Total").unwrap().year_total, 4);
    }

    #[test]
    fn pending_excluded_from_total_but_counted_as_key() {
        let records = vec![
            rec("1", Some("2024-03-01T08:00"), Hit, ""),
            rec("2", Some("2024-03-01T09:00"), Pending, ""),
        ];
        let periods = summarize_periods(&records, None);
        assert_eq!(periods[0].unique_keys, 2);
        assert_eq!(periods[0].total_count, 1);
        assert_eq!(periods[0].hit_percentage, 100);
    }

    #[test]
    fn duplicate_keys_count_once_per_period() {
        let records = vec![
            rec("A", Some("2024-03-01T08:00"), Hit, ""),
            rec("A", Some("2024-03-02T08:00"), Miss, ""),
            rec("A", Some("2024-04-02T08:00"), Miss, ""),
        ];
        let periods = summarize_periods(&records, None);
        assert_eq!(periods[0].hit_count, 1);
        assert_eq!(periods[0].miss_count, 0);
        assert_eq!(periods[1].miss_count, 1);
    }

    #[test]
    fn fallback_date_and_undated_records() {
        let mut r = rec("1", None, Pending, "");
        r.fallback_date = NaiveDateTime::parse_from_str("2024-05-05T00:00", "%Y-%m-%dT%H:%M").ok();
        let records = vec![r, rec("2", None, Pending, "")];
        let periods = summarize_periods(&records, None);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].label, "May");
        assert_eq!(periods[0].unique_keys, 1);
    }

    #[test]
    fn multi_year_labels_and_year_filter() {
        let records = vec![
            rec("1", Some("2023-12-30T08:00"), Hit, ""),
            rec("2", Some("2024-01-02T08:00"), Hit, ""),
        ];
        let (_, pivot) = build_pivot(&records, None, &[]);
        assert_eq!(pivot.columns, vec!["Dec 2023", "Jan 2024"]);

        let (_, pivot) = build_pivot(&records, Some(2024), &[]);
        assert_eq!(pivot.columns, vec!["Jan"]);
    }

    #[test]
    fn missing_requested_periods_get_notices() {
        let records = vec![rec("1", Some("2024-01-02T08:00"), Hit, "")];
        let (_, pivot) = build_pivot(&records, None, &[1, 2, 3]);
        assert_eq!(pivot.columns, vec!["Jan"]);
        assert_eq!(pivot.notices, vec!["No data for Feb", "No data for Mar"]);
    }

    #[test]
    fn out_of_range_requested_months_are_ignored() {
        let (_, pivot) = build_pivot(&[], None, &[0, 13, 2]);
        assert_eq!(pivot.notices, vec!["No data for Feb"]);
    }

    #[test]
    fn empty_input() {
        let (periods, pivot) = build_pivot(&[], None, &[1]);
        assert!(periods.is_empty());
        assert!(pivot.columns.is_empty());
        assert_eq!(pivot.row("Hit %").unwrap().year_total, 0);
        assert_eq!(pivot.notices, vec!["No data for Jan"]);
    }

    fn class_strategy() -> impl Strategy<Value = Classification> {
        prop_oneof![Just(Hit), Just(Miss), Just(Pending)]
    }

    proptest! {
        #[test]
        fn total_row_is_hit_plus_miss(
            items in proptest::collection::vec((0u32..40, 1u32..13, 1u32..28, class_strategy()), 0..60)
        ) {
            let records: Vec<JoinedRecord> = items
                .iter()
                .map(|(k, m, d, c)| {
                    let start = format!("2024-{m:02}-{d:02}T08:00");
                    rec(&k.to_string(), Some(&start), *c, "r")
                })
                .collect();
            let (_, pivot) = build_pivot(&records, None, &[]);
            let hit = pivot.row("Hit").unwrap();
            let miss = pivot.row("Miss").unwrap();
            let total = pivot.row("Total").unwrap();
            for i in 0..pivot.columns.len() {
                prop_assert_eq!(total.values[i], hit.values[i] + miss.values[i]);
            }
            prop_assert_eq!(total.year_total, hit.year_total + miss.year_total);
        }
    }
}
