pub const EXAM_WEIGHT: f64 = 0.5;
pub const QUIZ_WEIGHT: f64 = 0.3;
pub const HOMEWORK_WEIGHT: f64 = 0.2;

/// Combines per-category means into one score. An absent category adds
/// nothing to the sum; the remaining weights are not renormalized.
pub fn weighted_average(exam: Option<f64>, quiz: Option<f64>, homework: Option<f64>) -> f64 {
    EXAM_WEIGHT * exam.unwrap_or(0.0)
        + QUIZ_WEIGHT * quiz.unwrap_or(0.0)
        + HOMEWORK_WEIGHT * homework.unwrap_or(0.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_fixed_weights() {
        let score = weighted_average(Some(80.0), Some(90.0), Some(70.0));
        assert!((score - (40.0 + 27.0 + 14.0)).abs() < 1e-9);
    }

    #[test]
    fn absent_categories_count_as_zero() {
        assert!((weighted_average(Some(85.0), None, None) - 42.5).abs() < 1e-9);
        assert_eq!(weighted_average(None, None, None), 0.0);
    }

    #[test]
    fn mean_of_empty_slice_is_absent() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[80.0, 90.0]), Some(85.0));
    }

    #[test]
    fn out_of_range_scores_pass_through() {
        let score = weighted_average(Some(120.0), Some(-10.0), None);
        assert!((score - 57.0).abs() < 1e-9);
    }
}
