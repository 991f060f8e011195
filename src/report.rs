//! Output persistence
//!
//! Every table is written as CSV into the output directory, with one progress
//! line per file on stdout. The optional JSON report bundles all tables.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::comparison::ComparisonResult;
use crate::csv_output::CsvReport;
use crate::error::{AnalysisError, Result};
use crate::profile::{FrequencyTable, InfluenceResult};
use crate::stats::ToolSummary;

pub const DESCRIPTIVE_FILE: &str = "descriptive_stats.csv";
pub const HYPOTHESIS_FILE: &str = "hypothesis_results.csv";
pub const PROFILE_STATS_FILE: &str = "profile_stats.csv";
pub const PROFILE_INFLUENCE_FILE: &str = "profile_influence.csv";
pub const SCATTER_FILE: &str = "corr_scatter_experience_vs_errors.png";
pub const JSON_REPORT_FILE: &str = "analysis_report.json";

/// File name of the box plot for a metric key (`tempo_h`, `erros`, `design`)
pub fn boxplot_file(metric_key: &str) -> String {
    format!("boxplot_{}.png", metric_key)
}

/// Everything an analysis run computed
///
/// NaN values serialise as `null` in the JSON report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// Rows after the metrics/profile join
    pub participants: usize,
    pub descriptive: Vec<ToolSummary>,
    pub hypothesis: Vec<ComparisonResult>,
    pub profile_frequencies: FrequencyTable,
    pub profile_influence: Vec<InfluenceResult>,
    /// Files written so far, in order
    #[serde(skip)]
    pub written_files: Vec<PathBuf>,
}

/// Create the output directory (and parents) if needed
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))
}

/// Write one table and announce it on stdout
pub fn write_table(table: &CsvReport, dir: &Path, file_name: &str, what: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    table.write_to(&path)?;
    tracing::debug!("{} rows written to {}", table.rows().len(), path.display());
    println!("{} written to {}", what, path.display());
    Ok(path)
}

/// Write the JSON report (pretty-printed)
pub fn write_json_report(report: &AnalysisReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(JSON_REPORT_FILE);
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| AnalysisError::Statistics(format!("cannot serialise report: {}", e)))?;
    std::fs::write(&path, json).map_err(|e| AnalysisError::io(&path, e))?;
    println!("JSON report written to {}", path.display());
    Ok(path)
}
