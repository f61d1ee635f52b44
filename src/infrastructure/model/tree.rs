//! Gradient-boosted tree ensemble

use super::document::{NodeDocument, TreeDocument};
use super::Objective;
use crate::domain::{FeatureMatrix, InferenceError, Predictor};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A single regression tree. Node 0 is the root; children always have a
/// larger index than their parent, so traversal terminates.
#[derive(Debug, Clone)]
struct Tree {
    group: usize,
    nodes: Vec<Node>,
}

impl Tree {
    fn from_document(
        index: usize,
        doc: &TreeDocument,
        num_features: usize,
        num_groups: usize,
    ) -> Result<Self, String> {
        if doc.nodes.is_empty() {
            return Err(format!("tree {index} has no nodes"));
        }

        if doc.group >= num_groups {
            return Err(format!(
                "tree {index} targets group {} but the objective has {num_groups}",
                doc.group
            ));
        }

        let mut nodes = Vec::with_capacity(doc.nodes.len());
        for (position, node) in doc.nodes.iter().enumerate() {
            let node = match *node {
                NodeDocument::Leaf(value) => {
                    if !value.is_finite() {
                        return Err(format!("tree {index} node {position} has a non-finite leaf"));
                    }
                    Node::Leaf(value)
                }
                NodeDocument::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= num_features {
                        return Err(format!(
                            "tree {index} node {position} splits on feature {feature}, model has {num_features}"
                        ));
                    }
                    for child in [left, right] {
                        if child <= position || child >= doc.nodes.len() {
                            return Err(format!(
                                "tree {index} node {position} has invalid child {child}"
                            ));
                        }
                    }
                    if threshold.is_nan() {
                        return Err(format!("tree {index} node {position} has a NaN threshold"));
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
            };
            nodes.push(node);
        }

        Ok(Self {
            group: doc.group,
            nodes,
        })
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] < threshold { left } else { right };
                }
            }
        }
    }
}

/// Tree ensemble predictor (xgboost `gbtree` semantics)
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    objective: Objective,
    num_groups: usize,
    num_features: usize,
    base_margin: f64,
}

impl TreeEnsemble {
    pub fn from_documents(
        trees: &[TreeDocument],
        objective: Objective,
        num_groups: usize,
        num_features: usize,
        base_margin: f64,
    ) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("gbtree booster has no trees".to_string());
        }

        let trees = trees
            .iter()
            .enumerate()
            .map(|(i, doc)| Tree::from_document(i, doc, num_features, num_groups))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            objective,
            num_groups,
            num_features,
            base_margin,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Predictor for TreeEnsemble {
    fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        let mut margins = vec![0.0; self.num_groups];

        let scores = matrix
            .iter_rows()
            .map(|row| {
                margins.fill(self.base_margin);
                for tree in &self.trees {
                    margins[tree.group] += tree.evaluate(row);
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
        format!(
            "gbtree ({} trees, {})",
            self.num_trees(),
            self.objective.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(group: usize, feature: usize, threshold: f64, low: f64, high: f64) -> TreeDocument {
        TreeDocument {
            group,
            nodes: vec![
                NodeDocument::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                NodeDocument::Leaf(low),
                NodeDocument::Leaf(high),
            ],
        }
    }

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(2, rows).unwrap()
    }

    #[test]
    fn test_regression_sums_trees() {
        let ensemble = TreeEnsemble::from_documents(
            &[stump(0, 0, 5.0, 1.0, 2.0), stump(0, 1, 0.5, 10.0, 20.0)],
            Objective::SquaredError,
            1,
            2,
            0.5,
        )
        .unwrap();

        let scores = ensemble
            .predict(&matrix(vec![vec![1.0, 0.0], vec![5.0, 1.0]]))
            .unwrap();

        assert_eq!(scores, vec![11.5, 22.5]);
        assert_eq!(ensemble.describe(), "gbtree (2 trees, reg:squarederror)");
    }

    #[test]
    fn test_split_goes_left_below_threshold() {
        let ensemble =
            TreeEnsemble::from_documents(&[stump(0, 0, 5.0, -1.0, 1.0)], Objective::BinaryLogitRaw, 1, 2, 0.0)
                .unwrap();

        let scores = ensemble
            .predict(&matrix(vec![vec![4.999, 0.0], vec![5.0, 0.0]]))
            .unwrap();

        assert_eq!(scores, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_multiclass_softmax_picks_group() {
        let ensemble = TreeEnsemble::from_documents(
            &[
                stump(0, 0, 30.0, 1.0, -1.0),
                stump(1, 0, 30.0, 0.0, 0.0),
                stump(2, 0, 30.0, -1.0, 1.0),
            ],
            Objective::MultiSoftmax,
            3,
            2,
            0.0,
        )
        .unwrap();

        let scores = ensemble
            .predict(&matrix(vec![vec![25.0, 0.0], vec![45.0, 0.0]]))
            .unwrap();

        assert_eq!(scores, vec![0.0, 2.0]);
    }

    #[test]
    fn test_rejects_cyclic_children() {
        let doc = TreeDocument {
            group: 0,
            nodes: vec![
                NodeDocument::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 1,
                },
                NodeDocument::Leaf(1.0),
            ],
        };

        let err = TreeEnsemble::from_documents(&[doc], Objective::SquaredError, 1, 2, 0.0).unwrap_err();
        assert!(err.contains("invalid child 0"));
    }

    #[test]
    fn test_rejects_out_of_range_feature_and_group() {
        let err = TreeEnsemble::from_documents(&[stump(0, 2, 1.0, 0.0, 1.0)], Objective::SquaredError, 1, 2, 0.0)
            .unwrap_err();
        assert!(err.contains("feature 2"));

        let err = TreeEnsemble::from_documents(&[stump(1, 0, 1.0, 0.0, 1.0)], Objective::SquaredError, 1, 2, 0.0)
            .unwrap_err();
        assert!(err.contains("group 1"));
    }

    #[test]
    fn test_rejects_empty_ensemble() {
        assert!(TreeEnsemble::from_documents(&[], Objective::SquaredError, 1, 2, 0.0).is_err());
    }
}
