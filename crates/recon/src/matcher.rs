use std::collections::HashMap;

use crate::model::KeyMode;

/// Primary rows annotated with the secondary value found for their key.
#[derive(Debug)]
pub struct JoinOutput<T> {
    /// Aligned with the primary key slice. `None` = no secondary row.
    pub values: Vec<Option<T>>,
    pub mode: KeyMode,
    pub matched_rows: usize,
}

/// Key as written, minus surrounding whitespace.
pub fn trimmed_key(raw: &str) -> String {
    raw.trim().to_string()
}

/// Key with numeric formatting and leading zeros removed: `"001"`, `"1"`
/// and `"1.0"` all become `"1"`; `"00A7"` becomes `"A7"`.
pub fn canonical_key(raw: &str) -> String {
    let t = raw.trim();
    if t.is_empty() {
        return String::new();
    }
    if let Ok(n) = t.parse::<f64>() {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            return format!("{}", n as i64);
        }
    }
    let stripped = t.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Join secondary values onto primary keys.
///
/// Tries trimmed keys first. When fewer than half of the primary rows find a
/// partner, retries with [`canonical_key`] and keeps whichever pass matched
/// more rows (canonical on a tie). Duplicate secondary keys resolve to the
/// first occurrence. Empty keys never match.
pub fn join_on_key<T: Clone>(primary_keys: &[String], secondary: &[(String, T)]) -> JoinOutput<T> {
    let trimmed = join_with(primary_keys, secondary, trimmed_key);
    let total = primary_keys.len();

    if trimmed.1 * 2 >= total {
        log::debug!("join: {}/{} rows matched on trimmed keys", trimmed.1, total);
        return JoinOutput {
            values: trimmed.0,
            mode: KeyMode::Trimmed,
            matched_rows: trimmed.1,
        };
    }

    let canonical = join_with(primary_keys, secondary, canonical_key);
    log::debug!(
        "join: trimmed keys matched {}/{}, canonical keys matched {}/{}",
        trimmed.1,
        total,
        canonical.1,
        total
    );

    if canonical.1 >= trimmed.1 {
        JoinOutput {
            values: canonical.0,
            mode: KeyMode::Canonical,
            matched_rows: canonical.1,
        }
    } else {
        JoinOutput {
            values: trimmed.0,
            mode: KeyMode::Trimmed,
            matched_rows: trimmed.1,
        }
    }
}

fn join_with<T: Clone>(
    primary_keys: &[String],
    secondary: &[(String, T)],
    key_fn: fn(&str) -> String,
) -> (Vec<Option<T>>, usize) {
    let mut index: HashMap<String, &T> = HashMap::new();
    for (raw, value) in secondary {
        let k = key_fn(raw);
        if !k.is_empty() {
            index.entry(k).or_insert(value);
        }
    }

    let mut matched = 0;
    let values = primary_keys
        .iter()
        .map(|raw| {
            let k = key_fn(raw);
            if k.is_empty() {
                return None;
            }
            let hit = index.get(&k).map(|v| (*v).clone());
            if hit.is_some() {
                matched += 1;
            }
            hit
        })
        .collect();

    (values, matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    fn sec(pairs: &[(&str, i32)]) -> Vec<(String, i32)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(canonical_key("001"), "1");
        assert_eq!(canonical_key(" 1 "), "1");
        assert_eq!(canonical_key("1.0"), "1");
        assert_eq!(canonical_key("000"), "0");
        assert_eq!(canonical_key("00A7"), "A7");
        assert_eq!(canonical_key("SO-0012"), "SO-0012");
        assert_eq!(canonical_key("  "), "");
    }

    #[test]
    fn trimmed_pass_when_most_rows_match() {
        let primary = keys(&[" A1", "A2", "A3"]);
        let secondary = sec(&[("A1", 1), ("A2 ", 2)]);
        let out = join_on_key(&primary, &secondary);
        assert_eq!(out.mode, KeyMode::Trimmed);
        assert_eq!(out.matched_rows, 2);
        assert_eq!(out.values, vec![Some(1), Some(2), None]);
    }

    #[test]
    fn falls_back_to_canonical_keys() {
        let primary = keys(&["1", "002"]);
        let secondary = sec(&[("001", 10), ("2", 20)]);
        let out = join_on_key(&primary, &secondary);
        assert_eq!(out.mode, KeyMode::Canonical);
        assert_eq!(out.matched_rows, 2);
        assert_eq!(out.values, vec![Some(10), Some(20)]);
    }

    #[test]
    fn exactly_half_keeps_trimmed_pass() {
        let primary = keys(&["7", "008"]);
        let secondary = sec(&[("7", 1), ("8", 2)]);
        let out = join_on_key(&primary, &secondary);
        assert_eq!(out.mode, KeyMode::Trimmed);
        assert_eq!(out.values, vec![Some(1), None]);
    }

    #[test]
    fn first_duplicate_wins() {
        let primary = keys(&["K"]);
        let secondary = sec(&[("K", 1), ("K", 2)]);
        assert_eq!(join_on_key(&primary, &secondary).values, vec![Some(1)]);

        // Also under canonical keys: "01" seen before "1".
        let primary = keys(&["001"]);
        let secondary = sec(&[("01", 5), ("1", 6)]);
        assert_eq!(join_on_key(&primary, &secondary).values, vec![Some(5)]);
    }

    #[test]
    fn empty_keys_never_match() {
        let primary = keys(&["", "  "]);
        let secondary = sec(&[("", 1)]);
        let out = join_on_key(&primary, &secondary);
        assert_eq!(out.matched_rows, 0);
        assert_eq!(out.values, vec![None, None]);
    }

    #[test]
    fn unmatched_rows_are_retained() {
        let primary = keys(&["A", "B", "C"]);
        let secondary = sec(&[("B", 2)]);
        let out = join_on_key(&primary, &secondary);
        assert_eq!(out.values.len(), 3);
        assert_eq!(out.values, vec![None, Some(2), None]);
    }
}
