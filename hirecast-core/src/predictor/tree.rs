//! Fitted CART decision tree (sklearn-compatible semantics).

use super::{Prediction, Predictor, check_width};
use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

/// Whether leaves hold class counts or a regression target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeTask {
    Classification,
    Regression,
}

/// A node in pre-order layout. Children always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A decision tree exported from a fitted estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub task: TreeTask,
    pub n_features: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    /// Class labels, indexed like the leaf value vectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<f64>,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".into());
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.n_features {
            return Err(format!(
                "{} feature names for {} features",
                self.feature_names.len(),
                self.n_features
            ));
        }
        if self.task == TreeTask::Classification && self.classes.is_empty() {
            return Err("classification tree has no classes".into());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= self.n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, tree has {}",
                            self.n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let expected = match self.task {
                        TreeTask::Classification => self.classes.len(),
                        TreeTask::Regression => 1,
                    };
                    if value.len() != expected {
                        return Err(format!(
                            "leaf {idx} has {} values, expected {expected}",
                            value.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf, going left when `x <= threshold`.
    fn leaf_for(&self, features: &[f64]) -> Result<&[f64], InferenceError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().ok_or_else(|| {
                        InferenceError::model(format!("tree splits on missing feature {feature}"))
                    })?;
                    idx = if x <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value),
                None => {
                    return Err(InferenceError::model(format!(
                        "tree node {idx} does not exist"
                    )));
                }
            }
        }
    }

    /// Depth of the deepest leaf (root leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                let next = depths[idx] + 1;
                for child in [*left, *right] {
                    if let Some(d) = depths.get_mut(child) {
                        *d = next;
                        max = max.max(next);
                    }
                }
            }
        }
        max
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }
}

impl Predictor for DecisionTree {
    fn name(&self) -> &str {
        match self.task {
            TreeTask::Classification => "decision_tree_classifier",
            TreeTask::Regression => "decision_tree_regressor",
        }
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        let mut facts = vec![
            ("depth", self.depth().to_string()),
            ("leaves", self.leaf_count().to_string()),
            ("nodes", self.nodes.len().to_string()),
        ];
        if self.task == TreeTask::Classification {
            facts.push(("classes", self.classes.len().to_string()));
        }
        facts
    }

    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError> {
        check_width("model", self.n_features, features)?;
        let leaf = self.leaf_for(features)?;

        let value = match self.task {
            TreeTask::Regression => leaf.first().copied(),
            TreeTask::Classification => {
                // First maximum wins on ties.
                let mut best = 0;
                for (i, count) in leaf.iter().enumerate() {
                    if *count > leaf[best] {
                        best = i;
                    }
                }
                self.classes.get(best).copied()
            }
        }
        .ok_or_else(|| InferenceError::model("leaf does not match the tree's classes"))?;
        Ok(Prediction::single(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DecisionTree {
        // age <= 0.0 ? (healthy_eating <= 0.5 ? class 0 : class 1) : class 2
        DecisionTree {
            task: TreeTask::Classification,
            n_features: 4,
            feature_names: vec![],
            classes: vec![10.0, 20.0, 30.0],
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 4,
                },
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.5,
                    left: 2,
                    right: 3,
                },
                TreeNode::Leaf {
                    value: vec![5.0, 1.0, 0.0],
                },
                TreeNode::Leaf {
                    value: vec![0.0, 4.0, 1.0],
                },
                TreeNode::Leaf {
                    value: vec![1.0, 1.0, 7.0],
                },
            ],
        }
    }

    #[test]
    fn test_classifier_routes_by_threshold() {
        let tree = classifier();
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[-1.0, 0.0, 0.0, 0.0]).unwrap().values(), &[10.0]);
        assert_eq!(tree.predict(&[-1.0, 0.9, 0.0, 0.0]).unwrap().values(), &[20.0]);
        assert_eq!(tree.predict(&[2.0, 0.0, 0.0, 0.0]).unwrap().values(), &[30.0]);
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let tree = classifier();
        assert_eq!(tree.predict(&[0.0, 0.5, 0.0, 0.0]).unwrap().values(), &[10.0]);
    }

    #[test]
    fn test_classifier_ties_pick_first_class() {
        let tree = DecisionTree {
            task: TreeTask::Classification,
            n_features: 1,
            feature_names: vec![],
            classes: vec![0.0, 1.0],
            nodes: vec![TreeNode::Leaf {
                value: vec![3.0, 3.0],
            }],
        };
        assert_eq!(tree.predict(&[1.0]).unwrap().values(), &[0.0]);
    }

    #[test]
    fn test_regressor_returns_leaf_value() {
        let tree = DecisionTree {
            task: TreeTask::Regression,
            n_features: 1,
            feature_names: vec!["age".into()],
            classes: vec![],
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![42000.0],
                },
                TreeNode::Leaf {
                    value: vec![58000.5],
                },
            ],
        };
        tree.validate().unwrap();
        assert_eq!(tree.name(), "decision_tree_regressor");
        assert_eq!(tree.predict(&[1.0]).unwrap().to_string(), "[42000.0]");
        assert_eq!(tree.predict(&[2.0]).unwrap().to_string(), "[58000.5]");
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let err = classifier().predict(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            InferenceError::FeatureMismatch {
                stage: "model",
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = classifier();
        tree.nodes[1] = TreeNode::Split {
            feature: 1,
            threshold: 0.5,
            left: 0,
            right: 3,
        };
        let err = tree.validate().unwrap_err();
        assert!(err.contains("invalid child index 0"), "{err}");
    }

    #[test]
    fn test_validate_rejects_bad_feature_and_leaf_width() {
        let mut tree = classifier();
        tree.nodes[0] = TreeNode::Split {
            feature: 9,
            threshold: 0.0,
            left: 1,
            right: 4,
        };
        assert!(tree.validate().unwrap_err().contains("feature 9"));

        let mut tree = classifier();
        tree.nodes[4] = TreeNode::Leaf { value: vec![1.0] };
        assert!(tree.validate().unwrap_err().contains("leaf 4"));
    }

    #[test]
    fn test_validate_rejects_empty_tree() {
        let mut tree = classifier();
        tree.nodes.clear();
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_depth_and_leaves() {
        let tree = classifier();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_summary_reports_shape() {
        let facts = classifier().summary();
        assert_eq!(
            facts,
            vec![
                ("depth", "2".to_string()),
                ("leaves", "3".to_string()),
                ("nodes", "5".to_string()),
                ("classes", "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_node_json_layout() {
        let json = r#"{"split": {"feature": 2, "threshold": 0.25, "left": 1, "right": 2}}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(
            node,
            TreeNode::Split {
                feature: 2,
                threshold: 0.25,
                left: 1,
                right: 2
            }
        );
    }
}
