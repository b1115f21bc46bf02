//! Scaler artifacts and the `Scaler` capability.
//!
//! Mirrors the numerical methods a feature pipeline would apply at fit time
//! (standardize, min-max) plus a passthrough for models trained on raw data.

use crate::error::InferenceError;
use crate::predictor::check_width;
use serde::{Deserialize, Serialize};

/// Accept a numeric feature vector and return a normalized one of the same width.
pub trait Scaler: Send + Sync {
    fn name(&self) -> &str;

    fn n_features(&self) -> Option<usize>;

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// On-disk scaler artifact, tagged by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
    Identity(IdentityScaler),
}

impl ScalerArtifact {
    /// Validate the artifact and wrap it behind the `Scaler` capability.
    pub fn into_scaler(self) -> Result<Box<dyn Scaler>, String> {
        match self {
            Self::Standard(s) => {
                s.validate()?;
                Ok(Box::new(s))
            }
            Self::MinMax(s) => {
                s.validate()?;
                Ok(Box::new(s))
            }
            Self::Identity(s) => Ok(Box::new(s)),
        }
    }
}

fn default_true() -> bool {
    true
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Standardize features by removing the mean and scaling to unit variance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
}

impl StandardScaler {
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("standard scaler has no features".into());
        }
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if !all_finite(&self.mean) || !all_finite(&self.scale) {
            return Err("standard scaler has non-finite parameters".into());
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn name(&self) -> &str {
        "standard"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.mean.len(), features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let mut v = *x;
                if self.with_mean {
                    v -= mean;
                }
                // Constant columns are fitted with zero variance.
                if self.with_std && *scale != 0.0 {
                    v /= scale;
                }
                v
            })
            .collect())
    }
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Scale each feature into `feature_range` using the fitted min and max.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    pub fn validate(&self) -> Result<(), String> {
        if self.data_min.is_empty() {
            return Err("min-max scaler has no features".into());
        }
        if self.data_min.len() != self.data_max.len() {
            return Err(format!(
                "data_min has {} entries but data_max has {}",
                self.data_min.len(),
                self.data_max.len()
            ));
        }
        if !all_finite(&self.data_min) || !all_finite(&self.data_max) {
            return Err("min-max scaler has non-finite parameters".into());
        }
        let (lo, hi) = self.feature_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(format!("invalid feature_range ({lo}, {hi})"));
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn name(&self) -> &str {
        "min_max"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.data_min.len())
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.data_min.len(), features)?;
        let (lo, hi) = self.feature_range;
        Ok(features
            .iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(x, (min, max))| {
                let range = if max - min == 0.0 { 1.0 } else { max - min };
                (x - min) / range * (hi - lo) + lo
            })
            .collect())
    }
}

/// Passthrough for models fitted on unscaled features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityScaler {
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl Scaler for IdentityScaler {
    fn name(&self) -> &str {
        "identity"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if let Some(n) = self.n_features {
            check_width("scaler", n, features)?;
        }
        Ok(features.to_vec())
    }
}
