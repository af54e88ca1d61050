//! Out-of-sample error scoring and best-model selection.

/// Root-mean-squared-error between actuals and predictions, aligned
/// element-wise by position. Extra elements on either side are ignored.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    (sse / n as f64).sqrt()
}

/// One (model, RMSE) row of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub model: String,
    pub rmse: f64,
}

/// Minimum-RMSE score; ties go to the earliest entry.
pub fn best_score(scores: &[ModelScore]) -> Option<&ModelScore> {
    let mut best: Option<&ModelScore> = None;
    for score in scores {
        match best {
            Some(current) if score.rmse >= current.rmse => {}
            _ => best = Some(score),
        }
    }
    best
}
