use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    Exam,
    Quiz,
    Homework,
    Unrecognized(String),
}

impl ScoreKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "exam" => ScoreKind::Exam,
            "quiz" => ScoreKind::Quiz,
            "homework" => ScoreKind::Homework,
            other => ScoreKind::Unrecognized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEvent {
    pub learner_id: i64,
    pub class_id: i64,
    pub kind: ScoreKind,
    pub score: f64,
}

impl ScoreEvent {
    pub fn new(learner_id: i64, class_id: i64, kind: &str, score: f64) -> Self {
        Self {
            learner_id,
            class_id,
            kind: ScoreKind::parse(kind),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassAverage {
    pub class_id: i64,
    pub weighted_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerClassAverages {
    pub learner_id: i64,
    pub classes: Vec<ClassAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerOverallAverage {
    pub learner_id: i64,
    pub overall_average: f64,
    pub class_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortAverage {
    pub cohort_average: f64,
    pub learner_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AggregationResult {
    PerClassAverages(PerClassAverages),
    LearnerOverallAverage(LearnerOverallAverage),
    CohortAverage(CohortAverage),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_case_sensitively() {
        assert_eq!(ScoreKind::parse("exam"), ScoreKind::Exam);
        assert_eq!(ScoreKind::parse("quiz"), ScoreKind::Quiz);
        assert_eq!(ScoreKind::parse("homework"), ScoreKind::Homework);
        assert_eq!(
            ScoreKind::parse("Exam"),
            ScoreKind::Unrecognized("Exam".to_string())
        );
    }
}
