//! Linear booster

use super::Objective;
use crate::domain::{FeatureMatrix, InferenceError, Predictor};

/// Linear predictor (xgboost `gblinear` semantics)
///
/// `weights` is feature-major: `weights[feature * num_groups + group]`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: Vec<f64>,
    objective: Objective,
    num_features: usize,
    base_margin: f64,
}

impl LinearModel {
    pub fn new(
        weights: &[Vec<f64>],
        bias: Vec<f64>,
        objective: Objective,
        num_groups: usize,
        num_features: usize,
        base_margin: f64,
    ) -> Result<Self, String> {
        if weights.len() != num_features {
            return Err(format!(
                "gblinear has weights for {} features, model has {num_features}",
                weights.len()
            ));
        }

        if bias.len() != num_groups {
            return Err(format!(
                "gblinear bias has {} entries, objective has {num_groups} groups",
                bias.len()
            ));
        }

        let mut flat = Vec::with_capacity(num_features * num_groups);
        for (feature, row) in weights.iter().enumerate() {
            if row.len() != num_groups {
                return Err(format!(
                    "gblinear weights for feature {feature} have {} groups, expected {num_groups}",
                    row.len()
                ));
            }
            flat.extend_from_slice(row);
        }

        if flat.iter().chain(&bias).any(|w| !w.is_finite()) {
            return Err("gblinear contains non-finite coefficients".to_string());
        }

        Ok(Self {
            weights: flat,
            bias,
            objective,
            num_features,
            base_margin,
        })
    }

    fn num_groups(&self) -> usize {
        self.bias.len()
    }
}

impl Predictor for LinearModel {
    fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        let groups = self.num_groups();
        let mut margins = vec![0.0; groups];

        let scores = matrix
            .iter_rows()
            .map(|row| {
                for (g, margin) in margins.iter_mut().enumerate() {
                    *margin = self.base_margin + self.bias[g];
                }
                for (f, value) in row.iter().enumerate() {
                    let coefficients = &self.weights[f * groups..(f + 1) * groups];
                    for (margin, w) in margins.iter_mut().zip(coefficients) {
                        *margin += value * w;
                    }
                }
                self.objective.transform(&margins)
            })
            .collect();

        Ok(scores)
    }

    fn num_features(&self) -> usize {
        self.num_features
    }

    fn describe(&self) -> String {
        format!("gblinear ({})", self.objective.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression() {
        let model = LinearModel::new(
            &[vec![1.0], vec![1.0]],
            vec![0.0],
            Objective::SquaredError,
            1,
            2,
            0.0,
        )
        .unwrap();

        let matrix = FeatureMatrix::from_rows(2, vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(model.predict(&matrix).unwrap(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_linear_multiclass() {
        // group 0 favours small x, group 1 favours large x
        let model = LinearModel::new(
            &[vec![-1.0, 1.0]],
            vec![5.0, -5.0],
            Objective::MultiSoftmax,
            2,
            1,
            0.0,
        )
        .unwrap();

        let matrix = FeatureMatrix::from_rows(1, vec![vec![1.0], vec![10.0]]).unwrap();
        assert_eq!(model.predict(&matrix).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_shape_validation() {
        assert!(LinearModel::new(&[vec![1.0]], vec![0.0], Objective::SquaredError, 1, 2, 0.0).is_err());
        assert!(
            LinearModel::new(&[vec![1.0], vec![1.0, 2.0]], vec![0.0], Objective::SquaredError, 1, 2, 0.0)
                .is_err()
        );
        assert!(LinearModel::new(&[vec![1.0]], vec![0.0, 1.0], Objective::SquaredError, 1, 1, 0.0).is_err());
    }
}
