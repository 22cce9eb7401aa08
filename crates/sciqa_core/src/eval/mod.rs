use crate::domain::Letter;
use crate::error::AppError;

/// Fraction of predictions equal to the ground truth at the same position.
///
/// `predicted` may be shorter than `truth`; only the matching prefix of `truth`
/// is compared and the denominator is `predicted.len()`. A longer `predicted`
/// or an empty `predicted` is a validation error.
pub fn accuracy(predicted: &[Letter], truth: &[Letter]) -> Result<f64, AppError> {
    if predicted.len() > truth.len() {
        return Err(AppError::new(
            "EVAL_LENGTH_MISMATCH",
            "More predictions than ground-truth answers",
        )
        .with_details(format!(
            "predicted={}; truth={}",
            predicted.len(),
            truth.len()
        )));
    }
    if predicted.is_empty() {
        return Err(AppError::new(
            "EVAL_EMPTY_PREDICTIONS",
            "Cannot compute accuracy without predictions",
        ));
    }
    if predicted.len() < truth.len() {
        tracing::warn!(
            predicted = predicted.len(),
            truth = truth.len(),
            "scoring only the first predicted.len() ground-truth answers"
        );
    }

    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / predicted.len() as f64)
}
