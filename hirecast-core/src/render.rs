//! Result renderer: turns a prediction attempt into a user-facing message.

use crate::error::InferenceError;
use crate::predictor::Prediction;
use serde::Serialize;

/// What the front end should show after a triggered cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Rendered {
    Success {
        message: String,
        prediction: Prediction,
    },
    Failure {
        kind: &'static str,
        message: String,
    },
}

impl Rendered {
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Success banner text, with the prediction printed verbatim.
pub fn success_message(prediction: &Prediction) -> String {
    format!("Prediction --> {prediction}")
}

/// Message shown in place of a result when the attempt failed.
pub fn failure_message(err: &InferenceError) -> String {
    match err {
        InferenceError::Conversion { field, value } if value.trim().is_empty() => {
            format!("Please enter a number for '{field}'.")
        }
        InferenceError::Conversion { field, value } => {
            format!("'{value}' is not a number (field '{field}').")
        }
        InferenceError::InvalidRecord { message } => {
            format!("The form submission was malformed: {message}")
        }
        InferenceError::FeatureMismatch { .. } => {
            format!("The loaded model and scaler do not fit these inputs: {err}")
        }
        InferenceError::NonFiniteFeature { index } => {
            format!("Input {} produced a value that is not a finite number.", index + 1)
        }
        InferenceError::Model { message } => format!("The model failed to predict: {message}"),
    }
}

pub fn render(outcome: Result<Prediction, InferenceError>) -> Rendered {
    match outcome {
        Ok(prediction) => Rendered::Success {
            message: success_message(&prediction),
            prediction,
        },
        Err(err) => Rendered::Failure {
            kind: err.kind(),
            message: failure_message(&err),
        },
    }
}
