//! End-to-end analysis run
//!
//! Stages, in order: load metrics, load profiles, join, descriptive
//! statistics, hypothesis tests, profile frequencies, profile influence,
//! charts. Each table is written as soon as it is computed, so a failure in a
//! later stage leaves the earlier files in place.

use crate::comparison::{hypothesis_table, hypothesis_tests};
use crate::config::AnalysisConfig;
use crate::dataset::{join_profiles, load_metrics, load_profiles, Metric};
use crate::error::Result;
use crate::plots::{create_experience_scatter, create_metric_boxplot};
use crate::profile::{frequency_table, influence_table, profile_frequencies, profile_influence};
use crate::report::{
    boxplot_file, ensure_output_dir, write_json_report, write_table, AnalysisReport,
    DESCRIPTIVE_FILE, HYPOTHESIS_FILE, PROFILE_INFLUENCE_FILE, PROFILE_STATS_FILE, SCATTER_FILE,
};
use crate::stats::{descriptive_stats, descriptive_table};

/// Run the full analysis described by `config`
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    let out_dir = config.output_dir.as_path();
    ensure_output_dir(out_dir)?;

    let mut report = AnalysisReport::default();

    tracing::info!("Loading metrics from {}", config.metrics_path.display());
    let metrics = load_metrics(&config.metrics_path)?;

    tracing::info!("Loading profiles from {}", config.profile_path.display());
    let profiles = load_profiles(&config.profile_path)?;

    tracing::info!("Joining metrics with participant profiles");
    let records = join_profiles(&metrics, &profiles);
    tracing::debug!(
        metrics = metrics.len(),
        profiles = profiles.len(),
        joined = records.len(),
        "row counts"
    );
    report.participants = records.len();

    tracing::info!("Computing descriptive statistics");
    report.descriptive = descriptive_stats(&records);
    report.written_files.push(write_table(
        &descriptive_table(&report.descriptive),
        out_dir,
        DESCRIPTIVE_FILE,
        "Descriptive statistics",
    )?);

    tracing::info!(
        "Running hypothesis tests (normality alpha = {})",
        config.normality_alpha
    );
    report.hypothesis = hypothesis_tests(&records, config)?;
    report.written_files.push(write_table(
        &hypothesis_table(&report.hypothesis),
        out_dir,
        HYPOTHESIS_FILE,
        "Hypothesis results",
    )?);

    tracing::info!("Counting profile categories");
    report.profile_frequencies = profile_frequencies(&profiles);
    report.written_files.push(write_table(
        &frequency_table(&report.profile_frequencies),
        out_dir,
        PROFILE_STATS_FILE,
        "Profile statistics",
    )?);

    tracing::info!("Testing profile influence on outcomes");
    report.profile_influence = profile_influence(&records)?;
    report.written_files.push(write_table(
        &influence_table(&report.profile_influence),
        out_dir,
        PROFILE_INFLUENCE_FILE,
        "Profile influence",
    )?);

    if config.render_charts {
        tracing::info!("Rendering charts");
        for metric in Metric::ALL {
            let path = out_dir.join(boxplot_file(metric.key()));
            create_metric_boxplot(&records, metric, &path, config.chart_size())?;
            report.written_files.push(path);
        }
        let scatter = out_dir.join(SCATTER_FILE);
        if create_experience_scatter(&records, &scatter, config.chart_size())? {
            report.written_files.push(scatter);
        }
        println!("Charts written to {}", out_dir.display());
    } else {
        tracing::info!("Chart rendering disabled");
    }

    if config.write_json_report {
        let path = write_json_report(&report, out_dir)?;
        report.written_files.push(path);
    }

    Ok(report)
}
