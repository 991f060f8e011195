//! Experiment datasets: task metrics, participant profiles and their join
//!
//! Headers are the ones exported by the experiment forms and are matched
//! exactly. Numeric cells may use a decimal comma (`1,5`). When every ID in a
//! file is a number, IDs are compared by value, so `01` and `1` join.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::csv_input::CsvTable;
use crate::error::{AnalysisError, Result};

/// Tool label of the automated refactoring tool
pub const SMART_REFACTOR: &str = "SmartRefactor";
/// Tool label of the manual Eclipse workflow
pub const TRADITIONAL: &str = "Tradicional";

/// Metrics file headers
pub mod metrics_columns {
    pub const ID: &str = "ID";
    pub const TIME: &str = "Tempo (h)";
    pub const LOC: &str = "LOC Modificadas";
    pub const ERRORS: &str = "Erros Funcionais";
    pub const DESIGN: &str = "Problemas de Design";
    pub const TOOL: &str = "Ferramenta";
}

/// Profile file headers
pub mod profile_columns {
    pub const ID: &str = "ID";
    pub const EDUCATION: &str = "Formacao";
    pub const EXPERIENCE: &str = "Experiencia";
    pub const REFACTORING_KNOWLEDGE: &str = "Conhecimento_Refatoracao";
    pub const JAVA_KNOWLEDGE: &str = "Conhecimento_Java";
}

/// One task outcome for one participant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub id: String,
    pub time_hours: Option<f64>,
    pub lines_modified: Option<f64>,
    pub functional_errors: Option<f64>,
    pub design_issues: Option<f64>,
    pub tool: String,
}

/// Background of one participant
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileRecord {
    pub id: String,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub refactoring_knowledge: Option<String>,
    pub java_knowledge: Option<String>,
}

/// Metrics row joined with its participant's profile (if any)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantRecord {
    pub metrics: MetricRecord,
    pub profile: Option<ProfileRecord>,
}

/// Outcome metrics compared between tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TimeHours,
    FunctionalErrors,
    DesignIssues,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::TimeHours,
        Metric::FunctionalErrors,
        Metric::DesignIssues,
    ];

    /// Short key used in file names (`boxplot_<key>.png`)
    pub fn key(self) -> &'static str {
        match self {
            Metric::TimeHours => "tempo_h",
            Metric::FunctionalErrors => "erros",
            Metric::DesignIssues => "design",
        }
    }

    /// Human label used in tables and chart axes
    pub fn label(self) -> &'static str {
        match self {
            Metric::TimeHours => metrics_columns::TIME,
            Metric::FunctionalErrors => metrics_columns::ERRORS,
            Metric::DesignIssues => metrics_columns::DESIGN,
        }
    }

    /// Value of this metric for a record; `None` when missing
    pub fn value(self, record: &MetricRecord) -> Option<f64> {
        let value = match self {
            Metric::TimeHours => record.time_hours,
            Metric::FunctionalErrors => record.functional_errors,
            Metric::DesignIssues => record.design_issues,
        };
        value.filter(|v| !v.is_nan())
    }
}

/// Parse a number that may use a decimal comma
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok()
}

/// Blank cells are missing; any other text must parse
fn strict_number(raw: &str, column: &str, row: usize) -> Result<Option<f64>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(raw)
        .map(Some)
        .ok_or_else(|| AnalysisError::InvalidNumber {
            column: column.to_string(),
            row,
            value: raw.to_string(),
        })
}

/// Canonical IDs for one column
///
/// If every non-blank ID parses as a number, each is rewritten from its value
/// (`01` -> `1`, `2.50` -> `2.5`); otherwise IDs are only trimmed.
fn normalize_ids<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let trimmed: Vec<&str> = raw.map(str::trim).collect();
    let numeric: Option<Vec<Option<f64>>> = trimmed
        .iter()
        .map(|id| {
            if id.is_empty() {
                Some(None)
            } else {
                id.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
            }
        })
        .collect();

    match numeric {
        Some(values) if values.iter().any(Option::is_some) => values
            .into_iter()
            .map(|value| match value {
                Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
                Some(v) => v.to_string(),
                None => String::new(),
            })
            .collect(),
        _ => trimmed.into_iter().map(str::to_string).collect(),
    }
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Load the task metrics file
pub fn load_metrics(path: &Path) -> Result<Vec<MetricRecord>> {
    metrics_from_table(&CsvTable::from_path(path)?)
}

/// Normalize a parsed metrics table
///
/// Time and LOC are missing when blank and must otherwise be numeric; error
/// and design counts are coerced, with unparseable cells becoming missing.
pub fn metrics_from_table(table: &CsvTable) -> Result<Vec<MetricRecord>> {
    use metrics_columns::*;

    let id = table.column_index(ID)?;
    let time = table.column_index(TIME)?;
    let loc = table.column_index(LOC)?;
    let errors = table.column_index(ERRORS)?;
    let design = table.column_index(DESIGN)?;
    let tool = table.column_index(TOOL)?;
    let ids = normalize_ids(table.rows().iter().map(|row| row[id].as_str()));

    table
        .rows()
        .iter()
        .zip(ids)
        .enumerate()
        .map(|(i, (row, id))| -> Result<MetricRecord> {
            // 1-based data row, header excluded
            let row_no = i + 1;
            Ok(MetricRecord {
                id,
                time_hours: strict_number(&row[time], TIME, row_no)?,
                lines_modified: strict_number(&row[loc], LOC, row_no)?,
                functional_errors: parse_decimal(&row[errors]),
                design_issues: parse_decimal(&row[design]),
                tool: row[tool].trim().to_string(),
            })
        })
        .collect()
}

/// Load the participant profile file
pub fn load_profiles(path: &Path) -> Result<Vec<ProfileRecord>> {
    profiles_from_table(&CsvTable::from_path(path)?)
}

/// Normalize a parsed profile table
pub fn profiles_from_table(table: &CsvTable) -> Result<Vec<ProfileRecord>> {
    use profile_columns::*;

    let id = table.column_index(ID)?;
    let education = table.column_index(EDUCATION)?;
    let experience = table.column_index(EXPERIENCE)?;
    let refactoring = table.column_index(REFACTORING_KNOWLEDGE)?;
    let java = table.column_index(JAVA_KNOWLEDGE)?;
    let ids = normalize_ids(table.rows().iter().map(|row| row[id].as_str()));

    Ok(table
        .rows()
        .iter()
        .zip(ids)
        .map(|(row, id)| ProfileRecord {
            id,
            education: optional_text(&row[education]),
            experience: optional_text(&row[experience]),
            refactoring_knowledge: optional_text(&row[refactoring]),
            java_knowledge: optional_text(&row[java]),
        })
        .collect())
}

/// Left join metrics with profiles on participant ID
///
/// Every metrics row survives. A participant listed twice in the profile file
/// yields one joined row per profile entry.
pub fn join_profiles(
    metrics: &[MetricRecord],
    profiles: &[ProfileRecord],
) -> Vec<ParticipantRecord> {
    let mut by_id: HashMap<&str, Vec<&ProfileRecord>> = HashMap::new();
    for profile in profiles {
        by_id.entry(profile.id.as_str()).or_default().push(profile);
    }

    let mut joined = Vec::with_capacity(metrics.len());
    for record in metrics {
        match by_id.get(record.id.as_str()) {
            Some(matches) => {
                for profile in matches {
                    joined.push(ParticipantRecord {
                        metrics: record.clone(),
                        profile: Some((*profile).clone()),
                    });
                }
            }
            None => {
                tracing::warn!("No profile found for participant {}", record.id);
                joined.push(ParticipantRecord {
                    metrics: record.clone(),
                    profile: None,
                });
            }
        }
    }
    joined
}
