// Configuration for an analysis run
//
// Defaults reproduce the layout of the original experiment: both CSV files in
// the working directory and results under ./results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Settings for one analysis run
///
/// Values come from the defaults, then an optional TOML file, then CLI flags.
///
/// # Example
/// ```
/// use refactor_eval::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.normality_alpha, 0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Per-participant outcome metrics (`coleta.csv`)
    pub metrics_path: PathBuf,

    /// Participant background answers
    pub profile_path: PathBuf,

    /// Directory receiving every CSV, chart and report
    pub output_dir: PathBuf,

    /// Shapiro-Wilk significance level for the normality gate
    ///
    /// Both groups must have p > alpha for Welch's t-test to be used.
    pub normality_alpha: f64,

    /// Render PNG charts
    pub render_charts: bool,

    /// Chart size in pixels
    pub chart_width: u32,
    pub chart_height: u32,

    /// Also write `analysis_report.json`
    pub write_json_report: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metrics_path: PathBuf::from("./coleta.csv"),
            profile_path: PathBuf::from("./perfil_dos_participantes.csv"),
            output_dir: PathBuf::from("./results"),
            normality_alpha: 0.05,
            render_charts: true,
            // 6.4 x 4.8 inches at 300 dpi
            chart_width: 1920,
            chart_height: 1440,
            write_json_report: false,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_toml_str(&text)
            .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))
    }

    /// Chart size as (width, height)
    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart_width, self.chart_height)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.normality_alpha > 0.0 && self.normality_alpha < 1.0) {
            return Err(AnalysisError::Config(format!(
                "normality_alpha must be in (0, 1), got {}",
                self.normality_alpha
            )));
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(AnalysisError::Config(format!(
                "chart size must be non-zero, got {}x{}",
                self.chart_width, self.chart_height
            )));
        }

        Ok(())
    }
}
