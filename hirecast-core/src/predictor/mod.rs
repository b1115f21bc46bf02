//! Model artifacts and the `Predictor` capability.
//!
//! A model artifact is a fitted estimator exported as JSON. Every concrete
//! format is adapted behind [`Predictor`], so the inference adapter never
//! knows which estimator it is talking to.

pub mod linear;
pub mod tree;

pub use linear::LinearModel;
pub use tree::{DecisionTree, TreeNode, TreeTask};

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accept a numeric feature vector and return a prediction.
pub trait Predictor: Send + Sync {
    /// Short name of the estimator, used in logs and `/health`.
    fn name(&self) -> &str;

    /// Number of features the model was fitted on, when known.
    fn n_features(&self) -> Option<usize>;

    /// Predict a single row.
    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError>;

    /// Extra `(key, value)` facts about the fitted estimator, for `inspect`.
    fn summary(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Raw output of a predict call, one value per input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction {
    values: Vec<f64>,
}

impl Prediction {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn single(value: f64) -> Self {
        Self {
            values: vec![value],
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            // Plain decimal, never exponent form; whole numbers keep ".0".
            let text = v.to_string();
            if v.is_finite() && !text.contains('.') {
                write!(f, "{text}.0")?;
            } else {
                write!(f, "{text}")?;
            }
        }
        write!(f, "]")
    }
}

/// On-disk model artifact, tagged by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    Linear(LinearModel),
}

impl ModelArtifact {
    /// Validate the artifact and wrap it behind the `Predictor` capability.
    pub fn into_predictor(self) -> Result<Box<dyn Predictor>, String> {
        match self {
            Self::DecisionTree(tree) => {
                tree.validate()?;
                Ok(Box::new(tree))
            }
            Self::Linear(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Fail with `FeatureMismatch` unless `features` has the expected width.
pub(crate) fn check_width(
    stage: &'static str,
    expected: usize,
    features: &[f64],
) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::FeatureMismatch {
            stage,
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_display() {
        assert_eq!(Prediction::single(43.0).to_string(), "[43.0]");
        assert_eq!(Prediction::single(0.25).to_string(), "[0.25]");
        assert_eq!(Prediction::new(vec![1.0, -2.5]).to_string(), "[1.0, -2.5]");
        assert_eq!(Prediction::new(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_prediction_display_extremes_keep_fraction() {
        assert_eq!(
            Prediction::single(1e16).to_string(),
            "[10000000000000000.0]"
        );
        assert_eq!(Prediction::single(1e-7).to_string(), "[0.0000001]");
        assert_eq!(Prediction::single(-0.0).to_string(), "[-0.0]");
        assert_eq!(Prediction::single(f64::NAN).to_string(), "[NaN]");
    }

    #[test]
    fn test_prediction_serializes_as_array() {
        let json = serde_json::to_string(&Prediction::single(3.0)).unwrap();
        assert_eq!(json, "[3.0]");
    }

    #[test]
    fn test_model_artifact_tagged() {
        let json = r#"{"type": "linear", "coef": [1.0, 2.0], "intercept": 0.5}"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        let predictor = artifact.into_predictor().unwrap();
        assert_eq!(predictor.name(), "linear");
        assert_eq!(predictor.n_features(), Some(2));
    }

    #[test]
    fn test_model_artifact_unknown_type() {
        let json = r#"{"type": "random_forest", "trees": []}"#;
        assert!(serde_json::from_str::<ModelArtifact>(json).is_err());
    }
}
