use crate::aggregate::percentage;
use crate::model::{Classification, JoinStats, JoinedRecord, ReportSummary};

/// Compute overall Hit/Miss/Pending counts across every joined record.
pub fn compute_summary(records: &[JoinedRecord], join: JoinStats) -> ReportSummary {
    let mut hit = 0;
    let mut miss = 0;
    let mut pending = 0;

    for r in records {
        match r.classification {
            Classification::Hit => hit += 1,
            Classification::Miss => miss += 1,
            Classification::Pending => pending += 1,
        }
    }

    ReportSummary {
        total_records: records.len(),
        hit,
        miss,
        pending,
        hit_percentage: percentage(hit, hit + miss),
        join,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyMode;

    fn record(classification: Classification) -> JoinedRecord {
        JoinedRecord {
            key: "k".into(),
            start: None,
            end: None,
            fallback_date: None,
            reason: String::new(),
            classification,
            duration: None,
            extra: Vec::new(),
        }
    }

    #[test]
    fn summary_counts() {
        let records = vec![
            record(Classification::Hit),
            record(Classification::Hit),
            record(Classification::Hit),
            record(Classification::Miss),
            record(Classification::Pending),
        ];
        let join = JoinStats {
            mode: KeyMode::Trimmed,
            primary_rows: 5,
            matched_rows: 4,
        };
        let summary = compute_summary(&records, join);
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.hit, 3);
        assert_eq!(summary.miss, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.hit_percentage, 75);
        assert_eq!(summary.join.matched_rows, 4);
    }
}
