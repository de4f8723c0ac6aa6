use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::Classification;

/// Elapsed-time limit for a Hit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Threshold {
    /// Wall-clock hours between the two timestamps.
    Hours { hours: f64 },
    /// Calendar days strictly between the two dates, skipping one weekday.
    BusinessDays {
        days: u32,
        #[serde(default = "default_excluded_weekday")]
        excluded_weekday: Weekday,
    },
}

fn default_excluded_weekday() -> Weekday {
    Weekday::Fri
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Hours { hours: 24.0 }
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hours { hours } => write!(f, "{hours}h"),
            Self::BusinessDays {
                days,
                excluded_weekday,
            } => write!(f, "{days} business days (excl. {excluded_weekday})"),
        }
    }
}

/// Classification plus the display duration it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    pub classification: Classification,
    /// Hours rounded to 2 decimals, or whole business days.
    pub duration: Option<f64>,
}

impl Measured {
    fn pending() -> Self {
        Self {
            classification: Classification::Pending,
            duration: None,
        }
    }
}

/// Classify one record. Missing or out-of-order timestamps are Pending.
pub fn classify(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    threshold: &Threshold,
) -> Measured {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s <= e => (s, e),
        _ => return Measured::pending(),
    };

    match *threshold {
        Threshold::Hours { hours } => {
            let seconds = (end - start).num_seconds() as f64;
            let within = seconds <= hours * 3600.0;
            Measured {
                classification: if within {
                    Classification::Hit
                } else {
                    Classification::Miss
                },
                duration: Some(round2(seconds / 3600.0)),
            }
        }
        Threshold::BusinessDays {
            days,
            excluded_weekday,
        } => {
            let count = business_days_between(start.date(), end.date(), excluded_weekday);
            Measured {
                classification: if count <= days as u64 {
                    Classification::Hit
                } else {
                    Classification::Miss
                },
                duration: Some(count as f64),
            }
        }
    }
}

/// Days strictly after `start` and strictly before `end` that are not `excluded`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, excluded: Weekday) -> u64 {
    start
        .iter_days()
        .skip(1)
        .take_while(|d| *d < end)
        .filter(|d| chrono::Datelike::weekday(d) != excluded)
        .count() as u64
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
