//! Batch inference over a loaded model

use crate::domain::model::{FeatureMatrix, LoadedModel};
use crate::domain::InferenceError;

/// Run the model over every row of `matrix`.
///
/// The predictor is invoked once for the whole batch. Any failure, a score
/// count that differs from the row count, or a non-finite score aborts the
/// batch; callers never see partial output.
pub fn predict(model: &LoadedModel, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
    let expected = model.schema().len();
    if matrix.cols() != expected || model.predictor().num_features() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: matrix.cols(),
        });
    }

    if matrix.is_empty() {
        return Ok(Vec::new());
    }

    let scores = model.predictor().predict(matrix)?;

    if scores.len() != matrix.rows() {
        return Err(InferenceError::OutputLength {
            expected: matrix.rows(),
            actual: scores.len(),
        });
    }

    if let Some(row) = scores.iter().position(|s| !s.is_finite()) {
        return Err(InferenceError::NonFinite { row });
    }

    Ok(scores)
}
