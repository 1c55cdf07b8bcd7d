use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a parsed table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common DataFrame dtypes.
///
/// Serialized untagged, so a record exports as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// String form used for identifier comparison.
    ///
    /// Integers and integral floats both render without a fractional part,
    /// so `42` and `42.0` compare equal to the text `"42"`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "<null>"),
            other => write!(f, "{}", other.as_text()),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row as an ordered column → value mapping
// ---------------------------------------------------------------------------

/// A single row keyed by column name. Keys keep the file's column order,
/// both in memory and when serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new(entries: Vec<(String, CellValue)>) -> Self {
        Self { entries }
    }

    /// Look up a value by column name.
    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to scalar value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, CellValue>()? {
                    entries.push((name, value));
                }
                Ok(Record { entries })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

// ---------------------------------------------------------------------------
// Table – the parsed, rectangular content of one file
// ---------------------------------------------------------------------------

/// Ordered headers plus rows of equal width.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column headers in file order, unique.
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Position of a column by exact, case-sensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Build the keyed record for row `row`.
    pub fn record(&self, row: usize) -> Option<Record> {
        let cells = self.rows.get(row)?;
        let entries = self
            .headers
            .iter()
            .cloned()
            .zip(cells.iter().cloned())
            .collect();
        Some(Record::new(entries))
    }
}

// ---------------------------------------------------------------------------
// Boundary input and match output
// ---------------------------------------------------------------------------

/// A named binary blob handed in by the front end.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// The first row of one file whose `job_id` equals the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// File name with its last extension removed.
    pub source_name: String,
    /// Headers of the table the record came from, in file order.
    pub columns: Vec<String>,
    /// The full matching row, including `job_id`.
    pub record: Record,
}

impl MatchResult {
    /// Headers joined as `"a, b, c"`, the export representation.
    pub fn columns_joined(&self) -> String {
        self.columns.join(", ")
    }

    pub fn heading(&self) -> String {
        format!("Results for: {}", self.source_name)
    }

    pub fn columns_line(&self) -> String {
        format!("Column names: {}", self.columns_joined())
    }
}
