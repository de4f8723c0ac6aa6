// CSV/TSV import

use std::io::Read;
use std::path::Path;

use whdash_recon::model::{CellValue, RawSheet};

use crate::{sheet_from_grid, LoadError};

pub fn load(path: &Path, tab: bool) -> Result<RawSheet, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = if tab { b'\t' } else { sniff_delimiter(&content) };
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1");
    parse(name, &content, delimiter)
}

/// Parse delimited text into a sheet. Every field is kept as text; dates and
/// numbers are interpreted later by the normalizer.
pub fn parse(name: &str, content: &str, delimiter: u8) -> Result<RawSheet, LoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(CellValue::from).collect());
    }
    Ok(sheet_from_grid(name, grid))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                ::csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: lines agreeing with line 1, times its field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Order;Created;Packed\n1;2024-01-01;2024-01-02\n2;2024-01-03;2024-01-04\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Order,Created,Packed\n1,2024-01-01,2024-01-02\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_and_pipe() {
        assert_eq!(sniff_delimiter("Week\tTask\nW1\tPick\n"), b'\t');
        assert_eq!(sniff_delimiter("Week|Task\nW1|Pick\n"), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Order;Reason;WH\n1;\"Late, truck\";WH1\n2;\"Stock out\";WH2\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_load_with_leading_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, ";;\nOrder;Created;Packed\n001;2024-01-01 08:00;\n").unwrap();

        let sheet = load(&path, false).unwrap();
        assert_eq!(sheet.name, "orders");
        assert_eq!(sheet.headers, vec!["Order", "Created", "Packed"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.cell(0, 0), &CellValue::Text("001".into()));
        assert_eq!(sheet.cell(0, 2), &CellValue::Empty);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reasons.csv");
        // "Café" with 0xE9 for é
        fs::write(&path, b"Order,Reason\n1,Caf\xe9\n").unwrap();

        let sheet = load(&path, false).unwrap();
        assert_eq!(sheet.cell(0, 1), &CellValue::Text("Café".into()));
    }

    #[test]
    fn test_bom_stripped_from_header() {
        let sheet = parse("s", "\u{feff}Week,Task\nW1,Pick\n", b',').unwrap();
        assert_eq!(sheet.headers[0], "Week");
    }

    #[test]
    fn test_tsv_forced_tab() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.tsv");
        fs::write(&path, "Week\tTask, notes\nW1\tPick, pack\n").unwrap();
        let sheet = load(&path, true).unwrap();
        assert_eq!(sheet.headers, vec!["Week", "Task, notes"]);
    }
}
