//! CSV input for experiment data
//!
//! Small RFC 4180 reader: comma separator, double-quoted fields with doubled
//! quotes, quoted newlines, and CRLF or LF line endings. Both experiment
//! exports are a few dozen rows, so the whole file is parsed into memory.

use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Parsed CSV file: one header row plus data rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read and parse a CSV file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parse CSV text; `source` is used in error messages
    pub fn parse(source: &str, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = split_records(source, text)?.into_iter();

        let headers: Vec<String> = records
            .next()
            .ok_or_else(|| AnalysisError::Csv {
                file: source.to_string(),
                line: 1,
                message: "file has no header row".to_string(),
            })?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let width = headers.len();
        let rows = records
            .filter(|record| !(record.len() == 1 && record[0].trim().is_empty()))
            .map(|mut record| {
                if record.len() < width {
                    record.resize(width, String::new());
                }
                record
            })
            .collect();

        Ok(Self {
            source: source.to_string(),
            headers,
            rows,
        })
    }

    /// Data rows (header excluded)
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a required column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                file: self.source.clone(),
                column: name.to_string(),
            })
    }
}

/// Split text into records of fields, honouring quotes
fn split_records(source: &str, text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AnalysisError::Csv {
            file: source.to_string(),
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}
