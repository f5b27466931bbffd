use std::fmt::Write;

use crate::models::{
    AggregationResult, CohortAverage, LearnerOverallAverage, PerClassAverages,
};
use crate::weighting::{EXAM_WEIGHT, HOMEWORK_WEIGHT, QUIZ_WEIGHT};

#[derive(Debug, Clone)]
pub struct LearnerSection {
    pub learner_id: i64,
    pub per_class: Option<PerClassAverages>,
    pub overall: Option<LearnerOverallAverage>,
}

pub fn render_text(result: &AggregationResult) -> String {
    let mut output = String::new();

    match result {
        AggregationResult::PerClassAverages(per_class) => {
            let _ = writeln!(output, "Weighted averages for learner {}:", per_class.learner_id);
            for class in per_class.classes.iter() {
                let _ = writeln!(
                    output,
                    "- class {}: {:.2}",
                    class.class_id, class.weighted_average
                );
            }
        }
        AggregationResult::LearnerOverallAverage(overall) => {
            let _ = writeln!(
                output,
                "Learner {} overall average {:.2} across {} classes",
                overall.learner_id, overall.overall_average, overall.class_count
            );
        }
        AggregationResult::CohortAverage(cohort) => {
            let _ = writeln!(
                output,
                "Cohort average {:.2} across {} learners",
                cohort.cohort_average, cohort.learner_count
            );
        }
    }

    output
}

pub fn render_json(result: &AggregationResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn build_report(cohort: Option<&CohortAverage>, learners: &[LearnerSection]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Weighted Grades Report");
    let _ = writeln!(
        output,
        "Weights: exam {:.0}%, quiz {:.0}%, homework {:.0}%",
        EXAM_WEIGHT * 100.0,
        QUIZ_WEIGHT * 100.0,
        HOMEWORK_WEIGHT * 100.0
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cohort");

    match cohort {
        Some(cohort) => {
            let _ = writeln!(
                output,
                "- Average {:.2} across {} learners",
                cohort.cohort_average, cohort.learner_count
            );
        }
        None => {
            let _ = writeln!(output, "No score events recorded.");
        }
    }

    let mut ranked: Vec<&LearnerSection> = learners.iter().collect();
    ranked.sort_by(|a, b| {
        let left = a.overall.as_ref().map(|o| o.overall_average);
        let right = b.overall.as_ref().map(|o| o.overall_average);
        right
            .partial_cmp(&left)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for section in ranked {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Learner {}", section.learner_id);

        let (Some(per_class), Some(overall)) = (&section.per_class, &section.overall) else {
            let _ = writeln!(output, "No score events recorded for this learner.");
            continue;
        };

        let _ = writeln!(
            output,
            "Overall average {:.2} across {} classes",
            overall.overall_average, overall.class_count
        );
        for class in per_class.classes.iter() {
            let _ = writeln!(
                output,
                "- class {}: {:.2}",
                class.class_id, class.weighted_average
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassAverage;

    fn section(learner_id: i64, averages: &[(i64, f64)]) -> LearnerSection {
        let classes: Vec<ClassAverage> = averages
            .iter()
            .map(|&(class_id, weighted_average)| ClassAverage {
                class_id,
                weighted_average,
            })
            .collect();
        let overall = classes.iter().map(|c| c.weighted_average).sum::<f64>() / classes.len() as f64;

        LearnerSection {
            learner_id,
            overall: Some(LearnerOverallAverage {
                learner_id,
                overall_average: overall,
                class_count: classes.len(),
            }),
            per_class: Some(PerClassAverages {
                learner_id,
                classes,
            }),
        }
    }

    #[test]
    fn report_ranks_learners_by_overall_average() {
        let cohort = CohortAverage {
            cohort_average: 61.25,
            learner_count: 2,
        };
        let report = build_report(
            Some(&cohort),
            &[section(1, &[(331, 42.5)]), section(2, &[(331, 70.0), (414, 90.0)])],
        );

        assert!(report.contains("Weights: exam 50%, quiz 30%, homework 20%"));
        assert!(report.contains("- Average 61.25 across 2 learners"));
        let first = report.find("## Learner 2").unwrap();
        let second = report.find("## Learner 1").unwrap();
        assert!(first < second);
        assert!(report.contains("Overall average 80.00 across 2 classes"));
    }

    #[test]
    fn report_marks_missing_learners() {
        let missing = LearnerSection {
            learner_id: 9,
            per_class: None,
            overall: None,
        };
        let report = build_report(None, &[missing]);

        assert!(report.contains("No score events recorded."));
        assert!(report.contains("No score events recorded for this learner."));
    }

    #[test]
    fn text_and_json_rendering() {
        let result = AggregationResult::CohortAverage(CohortAverage {
            cohort_average: 55.0,
            learner_count: 3,
        });

        assert_eq!(render_text(&result), "Cohort average 55.00 across 3 learners\n");
        let json: serde_json::Value = serde_json::from_str(&render_json(&result).unwrap()).unwrap();
        assert_eq!(json["shape"], "cohort_average");
        assert_eq!(json["learner_count"], 3);
    }
}
