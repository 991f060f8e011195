//! refactor-eval - Statistical evaluation of a refactoring tool experiment
//!
//! Compares task metrics (time, functional errors, design issues) of
//! participants using the SmartRefactor tool against traditional
//! refactoring, and relates the outcomes to each participant's background.
//!
//! The [`pipeline::run`] entry point loads both CSV exports, joins them,
//! writes the summary tables and renders the comparison charts.

pub mod cli;
pub mod comparison;
pub mod config;
pub mod csv_input;
pub mod csv_output;
pub mod dataset;
pub mod error;
pub mod hypothesis;
pub mod pipeline;
pub mod plots;
pub mod profile;
pub mod report;
pub mod stats;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
