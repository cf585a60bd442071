//! CSV parsing for bulk imports.
//!
//! # Responsibility
//! - Split lines into fields honoring double quotes and `""` escapes.
//! - Build a header-keyed table that tolerates missing columns.
//!
//! # Invariants
//! - Header names are trimmed and lowercased; lookups are case-insensitive.
//! - Missing columns read as the empty string.
//! - Blank lines and rows whose fields are all blank are skipped.

use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// CSV parse failure.
#[derive(Debug)]
pub enum CsvError {
    /// Input has no header row.
    Empty,
    /// Reader rejected the input.
    Malformed { line: Option<u64>, message: String },
}

impl Display for CsvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "csv input has no header row"),
            Self::Malformed {
                line: Some(line),
                message,
            } => write!(f, "malformed csv at line {line}: {message}"),
            Self::Malformed {
                line: None,
                message,
            } => write!(f, "malformed csv: {message}"),
        }
    }
}

impl Error for CsvError {}

impl From<csv::Error> for CsvError {
    fn from(value: csv::Error) -> Self {
        Self::Malformed {
            line: value.position().map(|position| position.line()),
            message: value.to_string(),
        }
    }
}

/// One data row keyed by normalized header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Returns the trimmed value for `column`, or `""` if the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields
            .get(column.trim().to_ascii_lowercase().as_str())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Returns `Some(value)` when the column exists and is non-blank.
    pub fn get_non_empty(&self, column: &str) -> Option<&str> {
        let value = self.get(column);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Parsed CSV document: header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Returns whether a (normalized) header is present.
    pub fn has_column(&self, column: &str) -> bool {
        let wanted = column.trim().to_ascii_lowercase();
        self.headers.iter().any(|header| *header == wanted)
    }
}

/// Splits one CSV line into trimmed fields.
pub fn parse_csv_line(line: &str) -> Result<Vec<String>, CsvError> {
    let mut reader = reader_for(line);
    let mut record = StringRecord::new();
    if reader.read_record(&mut record)? {
        Ok(record_to_fields(&record))
    } else {
        Ok(Vec::new())
    }
}

/// Parses a full CSV document whose first non-blank line is the header.
pub fn parse_csv(text: &str) -> Result<CsvTable, CsvError> {
    let mut reader = reader_for(text);
    let mut records = reader.records();

    let headers = match records.next() {
        Some(record) => record_to_fields(&record?)
            .into_iter()
            .map(|header| header.to_ascii_lowercase())
            .collect::<Vec<_>>(),
        None => return Err(CsvError::Empty),
    };
    if headers.iter().all(|header| header.is_empty()) {
        return Err(CsvError::Empty);
    }

    let mut rows = Vec::new();
    for record in records {
        let values = record_to_fields(&record?);
        if values.iter().all(|value| value.is_empty()) {
            continue;
        }

        let mut fields = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = values.get(index).cloned().unwrap_or_default();
            fields.insert(header.clone(), value);
        }
        rows.push(CsvRow { fields });
    }

    Ok(CsvTable { headers, rows })
}

fn reader_for(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn record_to_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(|field| field.trim().to_string()).collect()
}
