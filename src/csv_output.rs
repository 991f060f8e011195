//! CSV output for summary tables
//!
//! Tables are written with the same conventions the experiment's earlier
//! tooling used, so downstream spreadsheets keep working: integral floats
//! keep one decimal, missing values are empty cells, booleans are
//! `True`/`False`.

use std::path::Path;

use crate::error::{AnalysisError, Result};

/// A single CSV cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(u64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl Cell {
    /// Float cell, `Missing` when the value is NaN
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Float(value)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => CsvReport::escape_field(s),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => format_float(*f),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Missing => String::new(),
        }
    }
}

/// Render a float the way the summary tables expect (`2.0`, `0.123`, `inf`)
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// CSV table formatter
#[derive(Debug, Clone)]
pub struct CsvReport {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl CsvReport {
    /// Create a report with the given header row
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row
    pub fn add_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        let header: Vec<String> = self.headers.iter().map(|h| Self::escape_field(h)).collect();
        output.push_str(&header.join(","));
        output.push('\n');

        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(Cell::render).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }

        output
    }

    /// Write the CSV to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_csv()).map_err(|e| AnalysisError::io(path, e))
    }
}
