//! Participant profile analysis
//!
//! Frequency tables of the profile categories, and the influence of
//! experience and self-rated knowledge on functional errors and design
//! issues (Spearman correlation on ordinal scores, Kruskal-Wallis across
//! experience brackets).

use std::collections::HashMap;

use serde::Serialize;

use crate::csv_output::{Cell, CsvReport};
use crate::dataset::{Metric, ParticipantRecord, ProfileRecord};
use crate::error::Result;
use crate::hypothesis::{kruskal_wallis, spearman};
use crate::stats::round_to;

/// Ordered category labels of an ordinal profile variable
#[derive(Debug, Clone, Copy)]
pub struct OrdinalScale {
    pub levels: &'static [&'static str],
}

/// Years of professional experience
pub const EXPERIENCE_SCALE: OrdinalScale = OrdinalScale {
    levels: &["0-1 anos", "1-2 anos", "3-5 anos", "6+ anos"],
};

/// Self-rated knowledge (refactoring, Java)
pub const KNOWLEDGE_SCALE: OrdinalScale = OrdinalScale {
    levels: &["Nenhum", "Básico", "Razoável", "Avançado"],
};

impl OrdinalScale {
    /// 0-based position of `category`; unknown labels are missing
    pub fn score(&self, category: Option<&str>) -> Option<f64> {
        let category = category?;
        self.levels
            .iter()
            .position(|level| *level == category)
            .map(|idx| idx as f64)
    }
}

/// Profile columns summarised in `profile_stats.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Education,
    Experience,
    RefactoringKnowledge,
    JavaKnowledge,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Education,
        ProfileField::Experience,
        ProfileField::RefactoringKnowledge,
        ProfileField::JavaKnowledge,
    ];

    /// Column name in the output tables
    pub fn key(self) -> &'static str {
        match self {
            ProfileField::Education => "formacao",
            ProfileField::Experience => "experiencia",
            ProfileField::RefactoringKnowledge => "kn_ref",
            ProfileField::JavaKnowledge => "kn_java",
        }
    }

    pub fn value(self, profile: &ProfileRecord) -> Option<&str> {
        match self {
            ProfileField::Education => profile.education.as_deref(),
            ProfileField::Experience => profile.experience.as_deref(),
            ProfileField::RefactoringKnowledge => profile.refactoring_knowledge.as_deref(),
            ProfileField::JavaKnowledge => profile.java_knowledge.as_deref(),
        }
    }
}

/// Category counts for every profile column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyTable {
    /// Row labels (categories)
    pub categories: Vec<String>,
    /// Column name and one count per category (`None` when absent)
    pub columns: Vec<(String, Vec<Option<u64>>)>,
}

/// Counts of each category in one column, most frequent first
///
/// Equal counts keep the order of first appearance.
pub fn value_counts<'a, I>(values: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-appearance order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Frequency table over the raw profile records
pub fn profile_frequencies(profiles: &[ProfileRecord]) -> FrequencyTable {
    let per_column: Vec<(ProfileField, Vec<(String, u64)>)> = ProfileField::ALL
        .iter()
        .map(|&field| (field, value_counts(profiles.iter().map(|p| field.value(p)))))
        .collect();

    let mut categories: Vec<String> = Vec::new();
    for (_, counts) in &per_column {
        for (category, _) in counts {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
    }

    let columns = per_column
        .into_iter()
        .map(|(field, counts)| {
            let cells = categories
                .iter()
                .map(|category| {
                    counts
                        .iter()
                        .find(|(c, _)| c == category)
                        .map(|(_, n)| *n)
                })
                .collect();
            (field.key().to_string(), cells)
        })
        .collect();

    FrequencyTable {
        categories,
        columns,
    }
}

/// Table layout of `profile_stats.csv` (unnamed index column first)
///
/// Counts render as floats (`9.0`); a category absent from a column leaves an
/// empty cell.
pub fn frequency_table(table: &FrequencyTable) -> CsvReport {
    let mut headers = vec![String::new()];
    headers.extend(table.columns.iter().map(|(name, _)| name.clone()));
    let mut report = CsvReport::new(headers.as_slice());

    for (row, category) in table.categories.iter().enumerate() {
        let mut cells = vec![Cell::text(category)];
        cells.extend(table.columns.iter().map(|(_, counts)| {
            counts[row].map_or(Cell::Missing, |n| Cell::Float(n as f64))
        }));
        report.add_row(cells);
    }
    report
}

/// One row of `profile_influence.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceResult {
    pub variable: String,
    pub metric: String,
    pub test: String,
    /// rho or H, rounded to 3 decimals
    pub coefficient: f64,
    /// Rounded to 5 decimals
    pub pvalue: f64,
}

const SPEARMAN_LABEL: &str = "Spearman ρ";
const KRUSKAL_LABEL: &str = "Kruskal‑Wallis";

/// Outcome metrics analysed against the profile, with their short labels
const OUTCOMES: [(Metric, &str); 2] = [
    (Metric::FunctionalErrors, "Erros"),
    (Metric::DesignIssues, "Design"),
];

fn ordinal_variables() -> [(&'static str, ProfileField, OrdinalScale); 3] {
    [
        ("Experiência", ProfileField::Experience, EXPERIENCE_SCALE),
        (
            "Conhecimento Refatoração",
            ProfileField::RefactoringKnowledge,
            KNOWLEDGE_SCALE,
        ),
        (
            "Conhecimento Java",
            ProfileField::JavaKnowledge,
            KNOWLEDGE_SCALE,
        ),
    ]
}

fn profile_value(record: &ParticipantRecord, field: ProfileField) -> Option<&str> {
    record.profile.as_ref().and_then(|p| field.value(p))
}

/// Influence of the participant profile on errors and design issues
pub fn profile_influence(records: &[ParticipantRecord]) -> Result<Vec<InfluenceResult>> {
    let mut results = Vec::new();

    for (label, field, scale) in ordinal_variables() {
        let scores: Vec<Option<f64>> = records
            .iter()
            .map(|r| scale.score(profile_value(r, field)))
            .collect();

        for (metric, metric_label) in OUTCOMES {
            let outcome: Vec<Option<f64>> =
                records.iter().map(|r| metric.value(&r.metrics)).collect();
            let correlation = spearman(&scores, &outcome)?;
            tracing::debug!(
                "Spearman {} vs {}: n = {}, rho = {:.3}",
                label,
                metric_label,
                correlation.n,
                correlation.coefficient
            );

            results.push(InfluenceResult {
                variable: label.to_string(),
                metric: metric_label.to_string(),
                test: SPEARMAN_LABEL.to_string(),
                coefficient: round_to(correlation.coefficient, 3),
                pvalue: round_to(correlation.pvalue, 5),
            });
        }
    }

    // levels with at least one joined row, in scale order
    let present: Vec<&str> = EXPERIENCE_SCALE
        .levels
        .iter()
        .copied()
        .filter(|level| {
            records
                .iter()
                .any(|r| profile_value(r, ProfileField::Experience) == Some(*level))
        })
        .collect();

    if present.len() >= 2 {
        for (metric, metric_label) in OUTCOMES {
            let groups: Vec<Vec<f64>> = present
                .iter()
                .map(|level| {
                    records
                        .iter()
                        .filter(|r| profile_value(r, ProfileField::Experience) == Some(*level))
                        .filter_map(|r| metric.value(&r.metrics))
                        .collect()
                })
                .collect();
            let test = kruskal_wallis(&groups)?;

            results.push(InfluenceResult {
                variable: "Experiência (categorias)".to_string(),
                metric: metric_label.to_string(),
                test: KRUSKAL_LABEL.to_string(),
                coefficient: round_to(test.statistic, 3),
                pvalue: round_to(test.pvalue, 5),
            });
        }
    } else {
        tracing::info!(
            "Skipping Kruskal-Wallis: only {} experience level(s) present",
            present.len()
        );
    }

    Ok(results)
}

/// Table layout of `profile_influence.csv`
pub fn influence_table(results: &[InfluenceResult]) -> CsvReport {
    let mut report = CsvReport::new(&["Variável ordinal", "Métrica", "Teste", "Coeficiente", "p_valor"]);
    for r in results {
        report.add_row(vec![
            Cell::text(&r.variable),
            Cell::text(&r.metric),
            Cell::text(&r.test),
            Cell::float(r.coefficient),
            Cell::float(r.pvalue),
        ]);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MetricRecord;

    fn profile(id: &str, education: &str, experience: &str, kn_ref: &str, kn_java: &str) -> ProfileRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ProfileRecord {
            id: id.to_string(),
            education: opt(education),
            experience: opt(experience),
            refactoring_knowledge: opt(kn_ref),
            java_knowledge: opt(kn_java),
        }
    }

    fn joined(experience: &str, kn_ref: &str, errors: Option<f64>, design: f64) -> ParticipantRecord {
        ParticipantRecord {
            metrics: MetricRecord {
                id: "P".to_string(),
                time_hours: Some(1.0),
                lines_modified: Some(1.0),
                functional_errors: errors,
                design_issues: Some(design),
                tool: "SmartRefactor".to_string(),
            },
            profile: Some(profile("P", "Graduação", experience, kn_ref, "Básico")),
        }
    }

    #[test]
    fn test_ordinal_scores() {
        assert_eq!(EXPERIENCE_SCALE.score(Some("0-1 anos")), Some(0.0));
        assert_eq!(EXPERIENCE_SCALE.score(Some("6+ anos")), Some(3.0));
        assert_eq!(KNOWLEDGE_SCALE.score(Some("Razoável")), Some(2.0));
        assert_eq!(KNOWLEDGE_SCALE.score(Some("Expert")), None);
        assert_eq!(KNOWLEDGE_SCALE.score(None), None);
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(vec![Some("b"), Some("a"), None, Some("a"), Some("c"), Some("b"), Some("a")]);
        assert_eq!(
            counts,
            vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_profile_frequencies_union_of_categories() {
        let profiles = vec![
            profile("1", "Graduação", "1-2 anos", "Básico", "Básico"),
            profile("2", "Mestrado", "1-2 anos", "Avançado", "Básico"),
            profile("3", "Graduação", "6+ anos", "", "Razoável"),
        ];
        let table = profile_frequencies(&profiles);
        assert_eq!(
            table.categories,
            vec!["Graduação", "Mestrado", "1-2 anos", "6+ anos", "Básico", "Avançado", "Razoável"]
        );
        let kn_ref = &table.columns[2];
        assert_eq!(kn_ref.0, "kn_ref");
        assert_eq!(kn_ref.1[4], Some(1));
        assert_eq!(kn_ref.1[6], None);

        let csv = frequency_table(&table).to_csv();
        assert!(csv.starts_with(",formacao,experiencia,kn_ref,kn_java\nGraduação,2.0,,,\n"));
        assert!(csv.contains("\nBásico,,,1.0,2.0\n"));
        assert!(csv.ends_with("\nRazoável,,,,1.0\n"));
    }

    #[test]
    fn test_profile_influence_rows() {
        let records = vec![
            joined("0-1 anos", "Nenhum", Some(4.0), 3.0),
            joined("0-1 anos", "Básico", Some(3.0), 2.0),
            joined("1-2 anos", "Básico", Some(2.0), 2.0),
            joined("3-5 anos", "Razoável", Some(1.0), 1.0),
            joined("6+ anos", "Avançado", None, 0.0),
            joined("6+ anos", "Avançado", Some(0.0), 1.0),
        ];
        let results = profile_influence(&records).unwrap();
        // 3 ordinal variables x 2 metrics + 2 Kruskal rows
        assert_eq!(results.len(), 8);

        let experience_errors = &results[0];
        assert_eq!(experience_errors.variable, "Experiência");
        assert_eq!(experience_errors.metric, "Erros");
        assert_eq!(experience_errors.test, "Spearman ρ");
        // tied experience ranks: rho = -9.5 / sqrt(95)
        assert_eq!(experience_errors.coefficient, -0.975);

        // Java knowledge is constant ("Básico") -> undefined correlation
        assert!(results[4].coefficient.is_nan());

        let kruskal = &results[6];
        assert_eq!(kruskal.variable, "Experiência (categorias)");
        assert_eq!(kruskal.test, "Kruskal‑Wallis");
        assert!(kruskal.coefficient > 0.0);
    }

    #[test]
    fn test_kruskal_skipped_with_single_level() {
        let records = vec![
            joined("1-2 anos", "Nenhum", Some(1.0), 1.0),
            joined("1-2 anos", "Básico", Some(2.0), 0.0),
            joined("1-2 anos", "Razoável", Some(3.0), 2.0),
        ];
        let results = profile_influence(&records).unwrap();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.test == "Spearman ρ"));
    }

    #[test]
    fn test_missing_profile_is_omitted() {
        let mut records = vec![
            joined("0-1 anos", "Nenhum", Some(3.0), 3.0),
            joined("1-2 anos", "Básico", Some(2.0), 2.0),
            joined("3-5 anos", "Razoável", Some(1.0), 1.0),
        ];
        let mut orphan = joined("6+ anos", "Avançado", Some(9.0), 9.0);
        orphan.profile = None;
        records.push(orphan);

        let results = profile_influence(&records).unwrap();
        assert_eq!(results[0].coefficient, -1.0);
    }

    #[test]
    fn test_influence_table_header() {
        assert_eq!(
            influence_table(&[]).to_csv(),
            "Variável ordinal,Métrica,Teste,Coeficiente,p_valor\n"
        );
    }
}
