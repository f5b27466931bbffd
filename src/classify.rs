use crate::models::{ScoreEvent, ScoreKind};
use crate::weighting;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores {
    pub exam: Vec<f64>,
    pub quiz: Vec<f64>,
    pub homework: Vec<f64>,
    pub skipped: usize,
}

impl CategoryScores {
    pub fn means(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        (
            weighting::mean(&self.exam),
            weighting::mean(&self.quiz),
            weighting::mean(&self.homework),
        )
    }

    pub fn weighted_average(&self) -> f64 {
        let (exam, quiz, homework) = self.means();
        weighting::weighted_average(exam, quiz, homework)
    }
}

pub fn classify<'a, I>(events: I) -> CategoryScores
where
    I: IntoIterator<Item = &'a ScoreEvent>,
{
    let mut buckets = CategoryScores::default();

    for event in events {
        match event.kind {
            ScoreKind::Exam => buckets.exam.push(event.score),
            ScoreKind::Quiz => buckets.quiz.push(event.score),
            ScoreKind::Homework => buckets.homework.push(event.score),
            ScoreKind::Unrecognized(_) => buckets.skipped += 1,
        }
    }

    buckets
}
