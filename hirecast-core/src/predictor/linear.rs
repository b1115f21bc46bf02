//! Linear regression: `intercept + coef · x`.

use super::{Prediction, Predictor, check_width};
use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.coef.is_empty() {
            return Err("linear model has no coefficients".into());
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err("linear model has non-finite parameters".into());
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.len())
    }

    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError> {
        check_width("model", self.coef.len(), features)?;
        let dot: f64 = self.coef.iter().zip(features).map(|(c, x)| c * x).sum();
        Ok(Prediction::single(self.intercept + dot))
    }
}
