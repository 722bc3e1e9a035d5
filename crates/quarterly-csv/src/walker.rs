//! Source discovery and record assembly.
//!
//! [`parse_tree`] walks a directory, hands every `.csv` file to
//! [`parse_file`], and collects both the records and the per-file failures.
//! A file that cannot be read never aborts the walk; an unreadable directory
//! does.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quarterly_core::{FileError, IngestError, QuarterKey, QuarterRecord, Result};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::classify::{classify_label, is_skipped_label};
use crate::identity::{FileIdentity, extract_identity};
use crate::normalize::normalize_value;
use crate::quarter::resolve_quarter;

/// Field separator used by statement exports.
pub const DELIMITER: u8 = b';';

/// Extension of source files, compared case-insensitively.
const SOURCE_EXTENSION: &str = ".csv";

/// Rows of one source file, header first.
///
/// Column 0 of every row is the row label; the header row carries one
/// quarter token per remaining column. Rows may differ in length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from already split rows.
    #[must_use]
    pub const fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Reads `;`-separated rows from `reader`.
    ///
    /// Quotes do not have to be balanced, rows may have any number of fields,
    /// and invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    /// Returns the reader's error if the underlying input fails.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        Ok(Self { rows })
    }

    /// Returns the total number of rows, header included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the header row, if any.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Returns every row after the header.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }
}

/// Outcome of walking a source tree.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Records from every file that parsed.
    pub records: Vec<QuarterRecord>,
    /// Number of files that parsed, including those that yielded no records.
    pub files_parsed: usize,
    /// Files that were skipped, with the reason.
    pub failures: Vec<FileError>,
}

impl ParseReport {
    /// Returns true if at least one file was skipped.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Returns true if `path` names a source file.
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// Walks `root` recursively and parses every source file in it.
///
/// Files are visited in file-name order. A file that fails to parse is
/// logged and recorded in [`ParseReport::failures`]; it does not stop the
/// walk.
///
/// # Errors
/// Returns [`IngestError::RootUnreadable`] if `root` or any directory below
/// it cannot be read.
#[instrument(skip_all, fields(root = %root.as_ref().display()))]
pub fn parse_tree(root: impl AsRef<Path>) -> Result<ParseReport> {
    let root = root.as_ref();
    let mut report = ParseReport::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestError::RootUnreadable {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;

        if entry.file_type().is_dir() || !is_source_file(entry.path()) {
            continue;
        }

        debug!(path = %entry.path().display(), "Parsing file");
        match parse_file(entry.path()) {
            Ok(records) => {
                report.files_parsed += 1;
                report.records.extend(records);
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Error parsing file");
                report.failures.push(e);
            }
        }
    }

    info!(
        files = report.files_parsed,
        failed = report.failures.len(),
        records = report.records.len(),
        "Finished parsing source tree"
    );
    Ok(report)
}

/// Parses a single source file into records.
///
/// Every record carries the company and category taken from the file name,
/// and no two records share a quarter.
///
/// # Errors
/// Returns a [`FileError`] if the file cannot be opened or read, or has
/// fewer than two rows.
pub fn parse_file(path: impl AsRef<Path>) -> std::result::Result<Vec<QuarterRecord>, FileError> {
    let path = path.as_ref();
    let table = read_table(path)?;
    let identity = extract_identity(path);
    Ok(assemble(&table, &identity))
}

/// Reads a source file into a [`RawTable`], requiring a header and at least
/// one data row.
///
/// # Errors
/// See [`parse_file`].
pub fn read_table(path: &Path) -> std::result::Result<RawTable, FileError> {
    let file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let table = RawTable::from_reader(file).map_err(|e| FileError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if table.len() < 2 {
        return Err(FileError::InsufficientRows {
            path: path.to_path_buf(),
            rows: table.len(),
        });
    }

    Ok(table)
}

/// Folds a table into one record per quarter.
///
/// Cells of the same quarter from different metric rows end up in the same
/// record. Rows with unknown labels, blank or `LTM` columns, malformed
/// quarter tokens and sentinel or unparseable cells are skipped silently.
/// Records that never received a figure are dropped. The result is ordered
/// by quarter.
#[must_use]
pub fn assemble(table: &RawTable, identity: &FileIdentity) -> Vec<QuarterRecord> {
    let Some(header) = table.header() else {
        return Vec::new();
    };

    let mut accumulated: BTreeMap<QuarterKey, QuarterRecord> = BTreeMap::new();

    for row in table.data_rows() {
        let Some(label) = row.first().map(|label| label.trim()) else {
            continue;
        };
        if is_skipped_label(label) {
            continue;
        }
        let Some(slot) = classify_label(label) else {
            continue;
        };

        for (token, cell) in header.iter().zip(row).skip(1) {
            let Some(key) = resolve_quarter(token) else {
                continue;
            };
            let Some(value) = normalize_value(cell) else {
                continue;
            };

            accumulated
                .entry(key)
                .or_insert_with(|| {
                    QuarterRecord::new(key, identity.company.as_str(), identity.category.as_str())
                })
                .set(slot, value);
        }
    }

    accumulated
        .into_values()
        .filter(|record| !record.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarterly_core::{MetricSlot, Quarter};
    use std::fs;
    use tempfile::TempDir;

    fn table(text: &str) -> RawTable {
        RawTable::from_reader(text.as_bytes()).unwrap()
    }

    fn identity() -> FileIdentity {
        FileIdentity {
            company: "ACME".to_string(),
            category: "Tech".to_string(),
        }
    }

    #[test]
    fn test_single_metric_row() {
        let records = assemble(&table(";2023Q1;2023Q2\nКапитализация;1000;1100\n"), &identity());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key(), QuarterKey::new(2023, Quarter::Q1));
        assert_eq!(records[0].capitalization, Some(1000.0));
        assert_eq!(records[1].key(), QuarterKey::new(2023, Quarter::Q2));
        assert_eq!(records[1].capitalization, Some(1100.0));
        assert!(records.iter().all(|r| r.company == "ACME" && r.category == "Tech"));
    }

    #[test]
    fn test_rows_merge_by_quarter() {
        let text = "\
;2023Q1;2023Q2;LTM
Дата отчета;2023-05-01;2023-08-01;
Валюта отчета;RUB;RUB;
Выручка, млрд руб;10,5;11;40
Чистая прибыль, млрд руб;1;-;5
Чистый долг, млрд руб;3;4;4
Долг, млрд руб;6;7;7
P/E;5,1;0.00;5
Число акций, млн;100;100;100
";
        let records = assemble(&table(text), &identity());

        assert_eq!(records.len(), 2);
        let q1 = &records[0];
        assert_eq!(q1.revenue, Some(10.5));
        assert_eq!(q1.net_profit, Some(1.0));
        assert_eq!(q1.debt, Some(6.0));
        assert_eq!(q1.pe, Some(5.1));

        let q2 = &records[1];
        assert_eq!(q2.revenue, Some(11.0));
        assert_eq!(q2.net_profit, None);
        assert_eq!(q2.debt, Some(7.0));
        assert_eq!(q2.pe, None);
    }

    #[test]
    fn test_short_rows_and_extra_columns() {
        let text = ";2023Q1;2023Q2\nВыручка;1;2;3;4\nEBITDA;5\n";
        let records = assemble(&table(text), &identity());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].revenue, Some(1.0));
        assert_eq!(records[0].ebitda, Some(5.0));
        assert_eq!(records[1].revenue, Some(2.0));
        assert_eq!(records[1].ebitda, None);
    }

    #[test]
    fn test_quarters_without_values_are_dropped() {
        let text = ";2023Q1;2023Q2;2023-H1\nROE, %;-;12%;9\nКоэффициент;1;2;3\n";
        let records = assemble(&table(text), &identity());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key(), QuarterKey::new(2023, Quarter::Q2));
        assert_eq!(records[0].roe, Some(12.0));
    }

    #[test]
    fn test_later_row_wins_within_slot() {
        let text = ";2024Q1\nВыручка;1\nВыручка, скорр.;2\n";
        let records = assemble(&table(text), &identity());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].revenue, Some(2.0));
    }

    #[test]
    fn test_unbalanced_quotes_are_tolerated() {
        let text = ";2023Q1;2023Q2\nВыручка;12\"3;\"4 5\"\n";
        let records = assemble(&table(text), &identity());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].revenue, Some(123.0));
        assert_eq!(records[1].revenue, Some(45.0));
    }

    #[test]
    fn test_parse_file_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ACME_Tech_2023.csv");
        fs::write(&path, ";2023Q1;2023Q2\nКапитализация;1000;1100\n").unwrap();

        let records = parse_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company, "ACME");
        assert_eq!(records[0].category, "Tech");
        assert_eq!(records[0].get(MetricSlot::Capitalization), Some(1000.0));
    }

    #[test]
    fn test_header_only_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ACME.csv");
        fs::write(&path, ";2023Q1;2023Q2\n").unwrap();

        let err = parse_file(&path).unwrap_err();
        assert!(matches!(err, FileError::InsufficientRows { rows: 1, .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = parse_file(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, FileError::Open { .. }));
    }

    #[test]
    fn test_parse_tree_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("2023").join("banks");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("BANK_Finance.CSV"), ";2023Q4\nВыручка;7\n").unwrap();
        fs::write(dir.path().join("EMPTY_Tech.csv"), ";2023Q1\n").unwrap();
        fs::write(dir.path().join("ACME_Tech.csv"), ";2023Q1\nВыручка;3\n").unwrap();
        fs::write(dir.path().join("notes.txt"), ";2023Q1\nВыручка;3\n").unwrap();

        let report = parse_tree(dir.path()).unwrap();

        assert_eq!(report.files_parsed, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.has_failures());
        assert!(report.failures[0].path().ends_with("EMPTY_Tech.csv"));

        let mut companies: Vec<_> = report.records.iter().map(|r| r.company.as_str()).collect();
        companies.sort_unstable();
        assert_eq!(companies, vec!["ACME", "BANK"]);
    }

    #[test]
    fn test_parse_tree_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = parse_tree(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, IngestError::RootUnreadable { .. }));
        assert!(err.to_string().contains("absent"));
    }

    #[test]
    fn test_source_extension_is_case_insensitive() {
        assert!(is_source_file(Path::new("a/ACME.csv")));
        assert!(is_source_file(Path::new("ACME.CsV")));
        assert!(!is_source_file(Path::new("ACME.csv.bak")));
        assert!(!is_source_file(Path::new("ACME")));
    }
}
