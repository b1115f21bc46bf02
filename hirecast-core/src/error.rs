//! Error types for the hirecast core library.
//!
//! Startup failures (`ArtifactError`, config, templates) surface through
//! `HirecastError` and abort the process. Per-request failures
//! (`InferenceError`) only abort the current prediction and are rendered back
//! to the user, so they never travel up as a `HirecastError`.

use std::path::PathBuf;

/// Top-level error type for the hirecast core library.
#[derive(Debug, thiserror::Error)]
pub enum HirecastError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the model and scaler at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact file not found: {path}")]
    Missing { path: PathBuf },

    #[error("Failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Errors raised by a single prediction attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("could not convert string to float: '{value}' (field '{field}')")]
    Conversion { field: String, value: String },

    #[error("Invalid input record: {message}")]
    InvalidRecord { message: String },

    #[error("{stage} expects {expected} features, got {actual}")]
    FeatureMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Feature {index} is not finite after scaling")]
    NonFiniteFeature { index: usize },

    #[error("Model error: {message}")]
    Model { message: String },
}

impl HirecastError {
    pub fn config(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl InferenceError {
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: msg.into(),
        }
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model {
            message: msg.into(),
        }
    }

    /// Stable, machine-readable tag for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conversion { .. } => "conversion",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::FeatureMismatch { .. } => "feature_mismatch",
            Self::NonFiniteFeature { .. } => "non_finite",
            Self::Model { .. } => "model",
        }
    }
}

impl ArtifactError {
    pub fn invalid(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Path of the artifact that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Missing { path }
            | Self::Read { path, .. }
            | Self::Corrupt { path, .. }
            | Self::Invalid { path, .. } => path,
        }
    }
}
