//! Inference adapter: raw form strings in, prediction out.
//!
//! One call handles exactly one row:
//! record → single-row table → `f64` coercion → scaler → model.

use crate::error::InferenceError;
use crate::predictor::{Prediction, Predictor};
use crate::scaler::Scaler;
use serde::Serialize;
use tracing::debug;

/// Feature columns in the order the model was fitted on.
pub const FEATURE_NAMES: [&str; 4] = ["age", "healthy_eating", "active_lifestyle", "Gender"];

/// The four user-supplied strings, keyed by feature name in fitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputRecord {
    fields: Vec<(String, String)>,
}

impl InputRecord {
    /// Build a record from `(name, value)` pairs.
    ///
    /// The pairs must name exactly the four features, in [`FEATURE_NAMES`]
    /// order.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, InferenceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        if names != FEATURE_NAMES {
            return Err(InferenceError::invalid_record(format!(
                "expected fields {FEATURE_NAMES:?}, got {names:?}"
            )));
        }
        Ok(Self { fields })
    }

    /// Convenience constructor taking the values in feature order.
    pub fn from_values(values: [&str; 4]) -> Self {
        Self {
            fields: FEATURE_NAMES
                .iter()
                .zip(values)
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A one-row table: named columns holding the raw cell strings.
#[derive(Debug, Clone)]
pub struct FeatureRow<'a> {
    columns: Vec<&'a str>,
    cells: Vec<&'a str>,
}

impl<'a> FeatureRow<'a> {
    pub fn from_record(record: &'a InputRecord) -> Self {
        let (columns, cells) = record.iter().unzip();
        Self { columns, cells }
    }

    pub fn columns(&self) -> &[&'a str] {
        &self.columns
    }

    /// Convert every cell to `f64`, column by column.
    ///
    /// Fails on the first cell that is not a number, naming its column.
    pub fn coerce(&self) -> Result<FeatureVector, InferenceError> {
        self.columns
            .iter()
            .zip(&self.cells)
            .map(|(column, cell)| {
                parse_float(cell).ok_or_else(|| InferenceError::Conversion {
                    field: column.to_string(),
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FeatureVector)
    }
}

/// Parse a cell the way a lenient float conversion would: surrounding
/// whitespace is ignored, empty strings fail.
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Ordered numeric features of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Run one record through coercion, scaling, and prediction.
///
/// The scaler always runs before the model; the model never sees raw values.
pub fn predict_record(
    record: &InputRecord,
    scaler: &dyn Scaler,
    predictor: &dyn Predictor,
) -> Result<Prediction, InferenceError> {
    let row = FeatureRow::from_record(record);
    let raw = row.coerce()?;
    debug!(features = ?raw.as_slice(), "Coerced input record");

    let scaled = scaler.transform(raw.as_slice())?;
    if scaled.len() != raw.len() {
        return Err(InferenceError::FeatureMismatch {
            stage: "scaler output",
            expected: raw.len(),
            actual: scaled.len(),
        });
    }
    if let Some(index) = scaled.iter().position(|v| !v.is_finite()) {
        return Err(InferenceError::NonFiniteFeature { index });
    }

    let prediction = predictor.predict(&scaled)?;
    debug!(%prediction, "Model prediction");
    Ok(prediction)
}
