//! Error types for the analysis pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::plots::PlotError;

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {file} at line {line}: {message}")]
    Csv {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    #[error("Invalid number in column '{column}' at row {row}: '{value}'")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Insufficient data for {what}: need at least {required} values, got {actual}")]
    InsufficientData {
        what: String,
        required: usize,
        actual: usize,
    },

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Plot(#[from] PlotError),
}

impl AnalysisError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
