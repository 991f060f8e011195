//! Comparison charts
//!
//! Box plots of each outcome metric per tool, plus a scatter of experience
//! against functional errors. Charts are rendered with [`plotters`] to PNG
//! through the bitmap backend, which needs no display server.

use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

use crate::dataset::{Metric, ParticipantRecord};
use crate::profile::EXPERIENCE_SCALE;
use crate::stats::{group_by_tool, metric_values, quantile_sorted};

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Fill/outline colours, one per tool in sorted order
const SERIES_COLORS: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

/// Whisker reach in interquartile ranges
const WHISKER_IQR: f64 = 1.5;

/// Box plot geometry of one sample
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme value within q1 - 1.5 IQR
    pub whisker_low: f64,
    /// Most extreme value within q3 + 1.5 IQR
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Quartiles by linear interpolation, whiskers at 1.5 IQR
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(PlotError::InvalidData(
                "cannot summarise an empty sample".to_string(),
            ));
        }

        if values.iter().any(|v| v.is_nan()) {
            return Err(PlotError::InvalidData("sample contains NaN".to_string()));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let inside = values
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v));
        let whisker_low = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
        let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Ok(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Y range covering all values with a small margin
fn padded_range(values: impl Iterator<Item = f64>) -> Result<std::ops::Range<f64>> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return Err(PlotError::InvalidData("no values to plot".to_string()));
    }
    let pad = if max > min { (max - min) * 0.08 } else { 1.0 };
    Ok((min - pad)..(max + pad))
}

/// Label for x positions that land on an integer category index
fn category_label(x: f64, labels: &[String]) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Draw a box plot of `metric` with one box per tool
pub fn create_metric_boxplot(
    records: &[ParticipantRecord],
    metric: Metric,
    output_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let groups: Vec<(String, Vec<f64>)> = group_by_tool(records)
        .into_iter()
        .map(|(tool, group)| (tool.to_string(), metric_values(group.iter().copied(), metric)))
        .filter(|(_, values)| !values.is_empty())
        .collect();
    if groups.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "no values for {}",
            metric.label()
        )));
    }

    let summaries = groups
        .iter()
        .map(|(_, values)| BoxSummary::from_values(values))
        .collect::<Result<Vec<_>>>()?;
    let labels: Vec<String> = groups.iter().map(|(tool, _)| tool.clone()).collect();
    let y_range = padded_range(groups.iter().flat_map(|(_, v)| v.iter().copied()))?;
    let x_range = -0.5..(groups.len() as f64 - 0.5);

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let title = format!("Distribuição de {} por ferramenta", metric.label());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 48))
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let label_formatter = |x: &f64| category_label(*x, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() * 2 + 1)
        .x_label_formatter(&label_formatter)
        .x_desc("Ferramenta")
        .y_desc(metric.label())
        .label_style(("sans-serif", 30))
        .axis_desc_style(("sans-serif", 36))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    const HALF_WIDTH: f64 = 0.25;
    for (i, summary) in summaries.iter().enumerate() {
        let x = i as f64;
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - HALF_WIDTH, summary.q1), (x + HALF_WIDTH, summary.q3)],
                color.mix(0.25).filled(),
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - HALF_WIDTH, summary.q1), (x + HALF_WIDTH, summary.q3)],
                color.stroke_width(2),
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let cap = HALF_WIDTH / 2.0;
        let lines = vec![
            vec![(x - HALF_WIDTH, summary.median), (x + HALF_WIDTH, summary.median)],
            vec![(x, summary.q3), (x, summary.whisker_high)],
            vec![(x, summary.q1), (x, summary.whisker_low)],
            vec![(x - cap, summary.whisker_high), (x + cap, summary.whisker_high)],
            vec![(x - cap, summary.whisker_low), (x + cap, summary.whisker_low)],
        ];
        chart
            .draw_series(
                lines
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(
                summary
                    .outliers
                    .iter()
                    .map(|&y| Circle::new((x, y), 6, BLACK.stroke_width(2))),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

/// (experience score, functional errors) points per tool
///
/// Records without a profile, a known experience bracket or an error count
/// are left out.
pub fn experience_points(records: &[ParticipantRecord]) -> Vec<(String, Vec<(f64, f64)>)> {
    group_by_tool(records)
        .into_iter()
        .map(|(tool, group)| {
            let points = group
                .iter()
                .filter_map(|r| {
                    let experience = r.profile.as_ref().and_then(|p| p.experience.as_deref());
                    let x = EXPERIENCE_SCALE.score(experience)?;
                    let y = Metric::FunctionalErrors.value(&r.metrics)?;
                    Some((x, y))
                })
                .collect();
            (tool.to_string(), points)
        })
        .collect()
}

/// Scatter of experience bracket against functional errors, one series per tool
///
/// Returns `false` without creating a file when there is nothing to plot.
pub fn create_experience_scatter(
    records: &[ParticipantRecord],
    output_path: &Path,
    size: (u32, u32),
) -> Result<bool> {
    let groups = experience_points(records);
    if groups.iter().all(|(_, points)| points.is_empty()) {
        tracing::warn!(
            "No participant has both an experience level and an error count; skipping scatter"
        );
        return Ok(false);
    }

    let y_range = padded_range(
        groups
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(_, y)| *y)),
    )?;
    let labels: Vec<String> = EXPERIENCE_SCALE.levels.iter().map(|l| l.to_string()).collect();
    let x_range = -0.5..(labels.len() as f64 - 0.5);

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Experiência vs. Erros Funcionais", ("sans-serif", 48))
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let label_formatter = |x: &f64| category_label(*x, &labels);
    chart
        .configure_mesh()
        .x_labels(labels.len() * 2 + 1)
        .x_label_formatter(&label_formatter)
        .x_desc("Experiência")
        .y_desc("Erros Funcionais")
        .label_style(("sans-serif", 30))
        .axis_desc_style(("sans-serif", 36))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    // small horizontal offset per tool so overlapping points stay visible
    let spread = 0.08;
    let center = (groups.len() as f64 - 1.0) / 2.0;
    for (i, (tool, points)) in groups.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let offset = (i as f64 - center) * spread;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x + offset, y), 8, color.filled())),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(tool.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 8, color.filled()));
    }

    chart
        .configure_series_labels()
        .label_font(("sans-serif", 30))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(true)
}
