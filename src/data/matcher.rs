use std::fmt;

use anyhow::Result;

use super::loader::{parse_table, split_extension, FileFormat};
use super::model::{MatchResult, UploadedFile};

/// The column every searchable file must carry.
pub const IDENTIFIER_COLUMN: &str = "job_id";

// ---------------------------------------------------------------------------
// Per-file outcome
// ---------------------------------------------------------------------------

/// Why a file produced no match without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedFileType,
    MissingIdentifierColumn,
    NoMatchFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFileType => write!(f, "unsupported file type"),
            SkipReason::MissingIdentifierColumn => {
                write!(f, "no '{IDENTIFIER_COLUMN}' column")
            }
            SkipReason::NoMatchFound => write!(f, "no matching row"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Matched(MatchResult),
    Skipped(SkipReason),
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Strip the last extension from a file name; names without one pass through.
pub fn clean_filename(name: &str) -> &str {
    split_extension(name).0
}

/// Search one file for the first row whose `job_id` equals `target_id`.
///
/// Values are compared as text with no trimming or case-folding, so a
/// numeric `42` cell matches the target `"42"`. Only a file that cannot be
/// parsed as its claimed format is an `Err`.
pub fn lookup(file: &UploadedFile, target_id: &str) -> Result<Lookup> {
    let Some(format) = FileFormat::from_name(&file.name) else {
        return Ok(Lookup::Skipped(SkipReason::UnsupportedFileType));
    };

    let table = parse_table(&file.bytes, format)?;
    log::debug!("{}: {} rows, columns {:?}", file.name, table.rows.len(), table.headers);

    let Some(id_idx) = table.column_index(IDENTIFIER_COLUMN) else {
        return Ok(Lookup::Skipped(SkipReason::MissingIdentifierColumn));
    };

    // First match wins; later duplicates are ignored.
    let hit = table
        .rows
        .iter()
        .position(|row| row[id_idx].as_text() == target_id);

    let Some(record) = hit.and_then(|row| table.record(row)) else {
        return Ok(Lookup::Skipped(SkipReason::NoMatchFound));
    };

    Ok(Lookup::Matched(MatchResult {
        source_name: clean_filename(&file.name).to_string(),
        columns: table.headers,
        record,
    }))
}

/// [`lookup`] collapsed to "match or nothing"; skip reasons are logged.
pub fn match_file(file: &UploadedFile, target_id: &str) -> Result<Option<MatchResult>> {
    match lookup(file, target_id)? {
        Lookup::Matched(result) => Ok(Some(result)),
        Lookup::Skipped(reason) => {
            log::debug!("Skipping {}: {reason}", file.name);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use rust_xlsxwriter::Workbook;

    fn csv(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes())
    }

    #[test]
    fn clean_filename_strips_one_extension() {
        assert_eq!(clean_filename("report.csv"), "report");
        assert_eq!(clean_filename("report"), "report");
        assert_eq!(clean_filename("report.v2.xlsx"), "report.v2");
    }

    #[test]
    fn returns_the_full_matching_row() {
        let file = csv("jobs1.csv", "job_id,name,hours\n41,Zed,3\n42,Alice,7.5\n");
        let result = match_file(&file, "42").unwrap().unwrap();

        assert_eq!(result.source_name, "jobs1");
        assert_eq!(result.columns, ["job_id", "name", "hours"]);
        assert_eq!(result.columns_joined(), "job_id, name, hours");
        assert_eq!(result.record.get("job_id"), Some(&CellValue::Integer(42)));
        assert_eq!(result.record.get("name"), Some(&CellValue::String("Alice".into())));
        assert_eq!(result.record.get("hours"), Some(&CellValue::Float(7.5)));
        assert_eq!(result.record.iter().map(|(k, _)| k).collect::<Vec<_>>(), result.columns);
    }

    #[test]
    fn first_matching_row_wins() {
        let file = csv("dupes.csv", "job_id,name\n9,first\n9,second\n");
        let result = match_file(&file, "9").unwrap().unwrap();
        assert_eq!(result.record.get("name"), Some(&CellValue::String("first".into())));
    }

    #[test]
    fn match_is_exact_text_equality() {
        let file = csv("ids.csv", "job_id,name\nJOB-1,a\n");
        assert!(match_file(&file, "JOB-1").unwrap().is_some());
        assert!(match_file(&file, "job-1").unwrap().is_none());
        assert!(match_file(&file, "JOB").unwrap().is_none());
        assert!(match_file(&file, " JOB-1").unwrap().is_none());
    }

    #[test]
    fn csv_ids_match_exactly_as_written() {
        for id in ["42.0", "123456789012345678901234", "1e3", "007.50", "0042"] {
            let file = csv("ids.csv", &format!("job_id,name\n{id},x\n"));
            let result = match_file(&file, id).unwrap();
            assert!(result.is_some(), "{id} should match itself");
            assert_eq!(
                result.unwrap().record.get("job_id"),
                Some(&CellValue::String(id.to_string()))
            );
        }

        let file = csv("ids.csv", "job_id,name\n42.0,x\n");
        assert!(match_file(&file, "42").unwrap().is_none());
    }

    #[test]
    fn numeric_spreadsheet_id_matches_text_target() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "job_id").unwrap();
        sheet.write_string(0, 1, "name").unwrap();
        sheet.write_number(1, 0, 42).unwrap();
        sheet.write_string(1, 1, "Alice").unwrap();
        let file = UploadedFile::new("jobs.xlsx", workbook.save_to_buffer().unwrap());

        let result = match_file(&file, "42").unwrap().unwrap();
        assert_eq!(result.source_name, "jobs");
        assert_eq!(result.record.get("job_id"), Some(&CellValue::Integer(42)));
    }

    #[test]
    fn skip_reasons() {
        let txt = csv("notes.txt", "job_id\n42\n");
        assert_eq!(
            lookup(&txt, "42").unwrap(),
            Lookup::Skipped(SkipReason::UnsupportedFileType)
        );

        let no_column = csv("other.csv", "id,name\n42,Alice\n");
        assert_eq!(
            lookup(&no_column, "42").unwrap(),
            Lookup::Skipped(SkipReason::MissingIdentifierColumn)
        );

        let wrong_case = csv("upper.csv", "JOB_ID,name\n42,Alice\n");
        assert_eq!(
            lookup(&wrong_case, "42").unwrap(),
            Lookup::Skipped(SkipReason::MissingIdentifierColumn)
        );

        let no_hit = csv("jobs.csv", "job_id,name\n1,Alice\n");
        assert_eq!(
            lookup(&no_hit, "42").unwrap(),
            Lookup::Skipped(SkipReason::NoMatchFound)
        );
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let broken = UploadedFile::new("broken.xlsx", b"not a zip".to_vec());
        assert!(match_file(&broken, "42").is_err());
    }
}
