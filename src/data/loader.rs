use std::collections::HashSet;
use std::io::Cursor;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};

use super::model::{CellValue, Table};

/// File extensions offered by the upload dialog.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// Tabular formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.xlsx` / `.xls`, read from the first worksheet.
    Spreadsheet,
    /// `.csv` with a header line.
    Csv,
}

impl FileFormat {
    /// Dispatch by the extension of `file_name`. The comparison ignores
    /// case, so `JOBS.CSV` reads as CSV. Returns `None` for anything
    /// unrecognized, including no extension.
    pub fn from_name(file_name: &str) -> Option<Self> {
        let (_, ext) = split_extension(file_name);
        match ext?.to_ascii_lowercase().as_str() {
            "xlsx" | "xls" => Some(FileFormat::Spreadsheet),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }
}

/// Split `name` into stem and last extension. Leading dots of the final
/// path component never start an extension, so `.hidden` has none.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let base_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &name[base_start..];
    let leading_dots = base.len() - base.trim_start_matches('.').len();

    match base.rfind('.') {
        Some(dot) if dot >= leading_dots => {
            let split = base_start + dot;
            (&name[..split], Some(&name[split + 1..]))
        }
        _ => (name, None),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse raw file bytes into a rectangular [`Table`].
pub fn parse_table(bytes: &[u8], format: FileFormat) -> Result<Table> {
    match format {
        FileFormat::Spreadsheet => parse_spreadsheet(bytes),
        FileFormat::Csv => parse_csv(bytes),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: first line holds the column names, every other line is a row.
/// Short rows are padded with nulls; long rows are rejected.
fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = unique_headers(raw_headers);
    let width = headers.len();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;

        if record.len() > width {
            bail!(
                "CSV row {}: expected {width} fields, saw {}",
                row_no + 1,
                record.len()
            );
        }

        let mut cells: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        cells.resize(width, CellValue::Null);
        rows.push(cells);
    }

    Ok(Table { headers, rows })
}

/// Numbers are typed only when their text form reproduces the field exactly,
/// so identifiers like `007`, `42.0` or `1e3` stay as written.
fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return keep_if_verbatim(CellValue::Integer(i), s);
    }
    if let Ok(f) = s.parse::<f64>() {
        return keep_if_verbatim(CellValue::Float(f), s);
    }
    match s {
        "true" | "True" => CellValue::Bool(true),
        "false" | "False" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

fn keep_if_verbatim(value: CellValue, raw: &str) -> CellValue {
    if value.as_text() == raw {
        value
    } else {
        CellValue::String(raw.to_string())
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet. The workbook flavour (xlsx, xls, xlsb, ods) is
/// sniffed from the content, so a mislabelled `.xls` holding xlsx data works.
fn parse_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut sheet_rows = range.rows();

    let Some(header_row) = sheet_rows.next() else {
        return Ok(Table::default());
    };
    let headers = unique_headers(header_row.iter().map(header_text).collect());

    let rows: Vec<Vec<CellValue>> = sheet_rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .collect();

    Ok(Table { headers, rows })
}

fn header_text(cell: &Data) -> String {
    match convert_cell(cell) {
        CellValue::Null => String::new(),
        other => other.as_text(),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => integral_or_float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => CellValue::String(dt.to_string()),
            None => CellValue::String(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

/// Spreadsheets store every number as a float; whole numbers become integers.
fn integral_or_float(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: <index>` and suffix repeats with `.1`, `.2`, …
/// so every column has a distinct key.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let name = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };

        let mut candidate = name.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
