//! Record parser: raw CSV rows into fixed-arity trimmed fields.

use std::fmt;

/// Message recorded for rows that carry fewer columns than their file type needs.
pub const ROW_FORMAT_MESSAGE: &str = "Row Format";

/// A row with fewer fields than the active file type requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFormatError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for RowFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROW_FORMAT_MESSAGE)
    }
}

impl std::error::Error for RowFormatError {}

/// One parsed row. `fields` holds exactly `arity` trimmed values; extra
/// columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: u64,
    pub fields: Vec<String>,
}

impl Record {
    pub fn parse(line: u64, raw: &csv::StringRecord, arity: usize) -> Result<Self, RowFormatError> {
        if raw.len() < arity {
            return Err(RowFormatError {
                expected: arity,
                found: raw.len(),
            });
        }

        let fields = raw
            .iter()
            .take(arity)
            .map(|field| field.trim().to_string())
            .collect();

        Ok(Self { line, fields })
    }

    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Only a row with no fields at all is padding. A whitespace-only or empty
/// quoted field is still a row and gets counted.
pub fn is_blank(raw: &csv::StringRecord) -> bool {
    raw.is_empty()
}

/// Strip a UTF-8 byte order mark, if present.
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
