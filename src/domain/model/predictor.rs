use std::fmt::Debug;

use super::FeatureMatrix;
use crate::domain::{Artifact, InferenceError, LoadedModel, ModelError};

/// Batch prediction over a decoded feature matrix
///
/// Implementations are immutable after construction and shared across
/// concurrent requests.
pub trait Predictor: Send + Sync + Debug {
    /// One score per matrix row, in row order
    fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError>;

    /// Number of input columns the predictor reads
    fn num_features(&self) -> usize;

    /// Short human readable summary for status endpoints
    fn describe(&self) -> String;
}

/// Turns artifact bytes into a ready-to-serve model
pub trait ModelDeserializer: Send + Sync + Debug {
    fn deserialize(&self, artifact: &Artifact) -> Result<LoadedModel, ModelError>;

    fn format_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Predicts the sum of each row
    #[derive(Debug)]
    pub struct SumPredictor {
        pub num_features: usize,
    }

    impl Predictor for SumPredictor {
        fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Ok(matrix.iter_rows().map(|row| row.iter().sum()).collect())
        }

        fn num_features(&self) -> usize {
            self.num_features
        }

        fn describe(&self) -> String {
            "sum".to_string()
        }
    }

    /// Always fails
    #[derive(Debug)]
    pub struct FailingPredictor {
        pub num_features: usize,
    }

    impl Predictor for FailingPredictor {
        fn predict(&self, _matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError::predictor("numeric overflow"))
        }

        fn num_features(&self) -> usize {
            self.num_features
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    /// Returns a fixed vector regardless of input
    #[derive(Debug)]
    pub struct FixedPredictor {
        pub num_features: usize,
        pub scores: Vec<f64>,
    }

    impl Predictor for FixedPredictor {
        fn predict(&self, _matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Ok(self.scores.clone())
        }

        fn num_features(&self) -> usize {
            self.num_features
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }
}
