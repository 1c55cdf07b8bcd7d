use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use super::error::BatchError;
use super::matcher::match_file;
use super::model::{MatchResult, Record, UploadedFile};

/// Suggested name for the downloaded export.
pub const EXPORT_FILE_NAME: &str = "results.json";

// ---------------------------------------------------------------------------
// Batch outcome
// ---------------------------------------------------------------------------

/// A file that could not be parsed as its claimed format.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    /// Name as uploaded, extension included.
    pub file_name: String,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not read {}: {}", self.file_name, self.message)
    }
}

/// Everything one search over a batch of files produced.
///
/// `matched_names[i]` is always `values[i].source_name`, and both follow
/// upload order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub target_id: String,
    pub matched_names: Vec<String>,
    pub values: Vec<MatchResult>,
    pub failures: Vec<FileFailure>,
}

/// Run the matcher over every file, in order.
///
/// Files without a match are left out silently. A file that fails to parse
/// is recorded in `failures` and the remaining files are still searched.
pub fn aggregate(files: &[UploadedFile], target_id: &str) -> Result<BatchOutcome, BatchError> {
    if files.is_empty() {
        return Err(BatchError::NoFiles);
    }
    if target_id.is_empty() {
        return Err(BatchError::EmptyJobId);
    }

    let mut outcome = BatchOutcome {
        target_id: target_id.to_string(),
        matched_names: Vec::new(),
        values: Vec::new(),
        failures: Vec::new(),
    };

    for file in files {
        match match_file(file, target_id) {
            Ok(Some(result)) => {
                outcome.matched_names.push(result.source_name.clone());
                outcome.values.push(result);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Could not read {}: {e:#}", file.name);
                outcome.failures.push(FileFailure {
                    file_name: file.name.clone(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    log::info!(
        "Searched {} file(s) for job_id {target_id}: {} match(es), {} unreadable",
        files.len(),
        outcome.values.len(),
        outcome.failures.len()
    );

    Ok(outcome)
}

impl BatchOutcome {
    pub fn has_matches(&self) -> bool {
        !self.values.is_empty()
    }

    /// Matched names joined as `"a, b"`.
    pub fn matched_files(&self) -> String {
        self.matched_names.join(", ")
    }

    pub fn export_document(&self) -> ExportDocument {
        ExportDocument {
            matched_files: self.matched_files(),
            results: self
                .values
                .iter()
                .map(|m| ExportEntry {
                    file_name: m.source_name.clone(),
                    columns: m.columns_joined(),
                    matched_data: m.record.clone(),
                })
                .collect(),
        }
    }

    /// The export document as 2-space indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export_document())
    }

    /// First line of the summary: the success count or the no-match notice.
    pub fn headline(&self) -> String {
        if self.has_matches() {
            format!("Found matching job_id in {} file(s)", self.values.len())
        } else {
            format!(
                "No matching job_id {} found in any of the uploaded files",
                self.target_id
            )
        }
    }

    /// Plain-text rendering of the outcome. The results panel shows the
    /// same lines; this form backs "Copy summary".
    pub fn summary(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.headline());
        if self.has_matches() {
            let _ = writeln!(out, "Matched Files: {}", self.matched_files());
            for m in &self.values {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", m.heading());
                let _ = writeln!(out, "{}", m.columns_line());
                for (column, value) in m.record.iter() {
                    let _ = writeln!(out, "  {column}: {value}");
                }
            }
        }

        for failure in &self.failures {
            let _ = writeln!(out, "{failure}");
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Export document
// ---------------------------------------------------------------------------

/// The downloadable JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub matched_files: String,
    pub results: Vec<ExportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub file_name: String,
    pub columns: String,
    pub matched_data: Record,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn csv(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes())
    }

    fn jobs2_xlsx() -> UploadedFile {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "job_id").unwrap();
        sheet.write_string(0, 1, "name").unwrap();
        sheet.write_number(1, 0, 7).unwrap();
        sheet.write_string(1, 1, "Bob").unwrap();
        UploadedFile::new("jobs2.xlsx", workbook.save_to_buffer().unwrap())
    }

    #[test]
    fn finds_single_match_across_mixed_formats() {
        let files = vec![
            csv("jobs1.csv", "job_id,name\n41,Carol\n42,Alice\n"),
            jobs2_xlsx(),
        ];
        let outcome = aggregate(&files, "42").unwrap();

        assert_eq!(outcome.matched_names, ["jobs1"]);
        let doc = outcome.export_document();
        assert_eq!(doc.matched_files, "jobs1");
        assert_eq!(
            doc.results[0].matched_data.get("name"),
            Some(&CellValue::String("Alice".into()))
        );
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn preserves_upload_order() {
        let files = vec![
            csv("a.csv", "job_id\n5\n"),
            csv("b.csv", "job_id\n6\n"),
            csv("c.v1.csv", "job_id,x\n5,y\n"),
        ];
        let outcome = aggregate(&files, "5").unwrap();

        assert_eq!(outcome.matched_names, ["a", "c.v1"]);
        let sources: Vec<_> = outcome.values.iter().map(|m| m.source_name.as_str()).collect();
        assert_eq!(sources, outcome.matched_names);
        assert_eq!(outcome.matched_files(), "a, c.v1");
    }

    #[test]
    fn unsupported_files_are_skipped_silently() {
        let files = vec![csv("notes.txt", "job_id\n42\n"), csv("jobs.csv", "job_id\n1\n")];
        let outcome = aggregate(&files, "42").unwrap();

        assert!(!outcome.has_matches());
        assert!(outcome.failures.is_empty());
        assert!(outcome
            .summary()
            .contains("No matching job_id 42 found in any of the uploaded files"));
    }

    #[test]
    fn parse_failure_does_not_abort_the_batch() {
        let files = vec![
            UploadedFile::new("broken.xlsx", b"garbage".to_vec()),
            csv("jobs.csv", "job_id,name\n42,Alice\n"),
        ];
        let outcome = aggregate(&files, "42").unwrap();

        assert_eq!(outcome.matched_names, ["jobs"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "broken.xlsx");
        assert!(outcome.summary().contains("Could not read broken.xlsx"));
    }

    #[test]
    fn rejects_empty_inputs() {
        assert_eq!(aggregate(&[], "42").unwrap_err(), BatchError::NoFiles);
        let files = vec![csv("jobs.csv", "job_id\n42\n")];
        assert_eq!(aggregate(&files, "").unwrap_err(), BatchError::EmptyJobId);
    }

    #[test]
    fn export_json_has_the_documented_shape() {
        let files = vec![csv("jobs1.csv", "job_id,name\n42,Alice\n")];
        let outcome = aggregate(&files, "42").unwrap();
        let json = outcome.to_json_pretty().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "matched_files": "jobs1",
                "results": [{
                    "file_name": "jobs1",
                    "columns": "job_id, name",
                    "matched_data": { "job_id": 42, "name": "Alice" }
                }]
            })
        );
        assert!(json.contains("\n  \"matched_files\""));
        // Keys stay in column order rather than sorted.
        assert!(json.find("\"job_id\": 42").unwrap() < json.find("\"name\": \"Alice\"").unwrap());
    }

    #[test]
    fn export_round_trips() {
        let files = vec![
            csv("jobs1.csv", "job_id,name,rate,note\n42,Alice,2.5,\n"),
            csv("jobs3.csv", "zone,job_id\nnorth,42\n"),
        ];
        let outcome = aggregate(&files, "42").unwrap();
        let doc = outcome.export_document();

        let back: ExportDocument =
            serde_json::from_str(&outcome.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.matched_files, "jobs1, jobs3");
        assert_eq!(back.results[1].matched_data.get("zone"), Some(&CellValue::String("north".into())));
    }

    #[test]
    fn summary_lists_each_match() {
        let files = vec![csv("jobs1.csv", "job_id,name\n42,Alice\n")];
        let summary = aggregate(&files, "42").unwrap().summary();

        assert!(summary.starts_with("Found matching job_id in 1 file(s)\n"));
        assert!(summary.contains("Matched Files: jobs1\n"));
        assert!(summary.contains("Results for: jobs1\n"));
        assert!(summary.contains("Column names: job_id, name\n"));
        assert!(summary.contains("  name: Alice\n"));
    }

    #[test]
    fn spreadsheet_dates_export_as_text() {
        let date = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "job_id").unwrap();
        sheet.write_string(0, 1, "due").unwrap();
        sheet.write_number(1, 0, 5).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        let files = vec![UploadedFile::new("dated.xlsx", workbook.save_to_buffer().unwrap())];

        let outcome = aggregate(&files, "5").unwrap();
        let doc = outcome.export_document();
        assert_eq!(
            doc.results[0].matched_data.get("due"),
            Some(&CellValue::String("2024-01-15 00:00:00".into()))
        );
        assert!(outcome
            .to_json_pretty()
            .unwrap()
            .contains("\"due\": \"2024-01-15 00:00:00\""));
    }

    #[test]
    fn summary_headline_and_failure_lines() {
        let files = vec![
            csv("jobs.csv", "job_id\n1\n"),
            UploadedFile::new("broken.xls", b"nope".to_vec()),
        ];
        let outcome = aggregate(&files, "42").unwrap();

        assert_eq!(
            outcome.headline(),
            "No matching job_id 42 found in any of the uploaded files"
        );
        let failure = outcome.failures[0].to_string();
        assert!(failure.starts_with("Could not read broken.xls: "));
        assert!(outcome.summary().lines().any(|line| line == failure));
    }
}
