//! CLI argument parsing for refactor-eval

use std::path::PathBuf;

use clap::Parser;

use crate::config::AnalysisConfig;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "refactor-eval")]
#[command(version)]
#[command(
    about = "Statistical comparison of SmartRefactor and traditional refactoring",
    long_about = None
)]
pub struct Cli {
    /// Metrics CSV (one row per participant task)
    #[arg(long = "metrics", value_name = "FILE")]
    pub metrics: Option<PathBuf>,

    /// Participant profile CSV
    #[arg(long = "profile", value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Directory for tables and charts
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML configuration file (flags override its values)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Shapiro-Wilk significance level for choosing the comparison test
    #[arg(long = "alpha", value_name = "P")]
    pub alpha: Option<f64>,

    /// Skip PNG chart rendering
    #[arg(long = "no-charts")]
    pub no_charts: bool,

    /// Also write analysis_report.json
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Override `config` with the flags that were given
    pub fn apply_to(&self, config: &mut AnalysisConfig) {
        if let Some(path) = &self.metrics {
            config.metrics_path = path.clone();
        }
        if let Some(path) = &self.profile {
            config.profile_path = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(alpha) = self.alpha {
            config.normality_alpha = alpha;
        }
        if self.no_charts {
            config.render_charts = false;
        }
        if self.json {
            config.write_json_report = true;
        }
    }

    /// Defaults, then the `--config` file, then flags
    pub fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }
}
