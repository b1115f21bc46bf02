//! Artifact loader.
//!
//! Reads the model and scaler once at startup. Any failure here is fatal to
//! the caller; there is no retry. The returned [`LoadedArtifacts`] is
//! immutable and meant to be shared behind an `Arc`.

use crate::config::ArtifactsConfig;
use crate::error::{ArtifactError, InferenceError};
use crate::inference::{FEATURE_NAMES, InputRecord, predict_record};
use crate::predictor::{ModelArtifact, Prediction, Predictor};
use crate::scaler::{Scaler, ScalerArtifact};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The model and scaler, ready for inference.
pub struct LoadedArtifacts {
    predictor: Box<dyn Predictor>,
    scaler: Box<dyn Scaler>,
    model_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("predictor", &self.predictor.name())
            .field("scaler", &self.scaler.name())
            .field("model_path", &self.model_path)
            .field("scaler_path", &self.scaler_path)
            .finish()
    }
}

impl LoadedArtifacts {
    /// Load both artifacts, resolving relative paths against `base_dir`.
    pub fn load(config: &ArtifactsConfig, base_dir: &Path) -> Result<Self, ArtifactError> {
        let model_path = base_dir.join(&config.model_path);
        let scaler_path = base_dir.join(&config.scaler_path);

        let predictor = read_artifact::<ModelArtifact>(&model_path)?
            .into_predictor()
            .map_err(|msg| ArtifactError::invalid(&model_path, msg))?;
        let scaler = read_artifact::<ScalerArtifact>(&scaler_path)?
            .into_scaler()
            .map_err(|msg| ArtifactError::invalid(&scaler_path, msg))?;

        info!(
            model = predictor.name(),
            scaler = scaler.name(),
            model_path = %model_path.display(),
            scaler_path = %scaler_path.display(),
            "Loaded artifacts"
        );

        let mut loaded = Self::from_parts(predictor, scaler);
        loaded.model_path = Some(model_path);
        loaded.scaler_path = Some(scaler_path);
        Ok(loaded)
    }

    /// Wrap already-built capabilities, e.g. stubs in tests.
    pub fn from_parts(predictor: Box<dyn Predictor>, scaler: Box<dyn Scaler>) -> Self {
        let loaded = Self {
            predictor,
            scaler,
            model_path: None,
            scaler_path: None,
        };
        loaded.warn_on_width_mismatch();
        loaded
    }

    fn warn_on_width_mismatch(&self) {
        let expected = FEATURE_NAMES.len();
        let model = self.predictor.n_features();
        let scaler = self.scaler.n_features();

        if let (Some(m), Some(s)) = (model, scaler) {
            if m != s {
                warn!(model = m, scaler = s, "Model and scaler disagree on feature count");
            }
        }
        for (stage, width) in [("model", model), ("scaler", scaler)] {
            match width {
                Some(n) if n != expected => {
                    warn!(stage, features = n, expected, "Artifact does not match the form's fields");
                }
                _ => {}
            }
        }
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn scaler_path(&self) -> Option<&Path> {
        self.scaler_path.as_deref()
    }

    /// Run one record through the loaded scaler and model.
    pub fn predict(&self, record: &InputRecord) -> Result<Prediction, InferenceError> {
        predict_record(record, self.scaler(), self.predictor())
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::LinearModel;
    use crate::scaler::IdentityScaler;
    use tempfile::TempDir;

    const MODEL: &str = r#"{
        "type": "decision_tree",
        "task": "regression",
        "n_features": 4,
        "nodes": [
            {"split": {"feature": 0, "threshold": 0.0, "left": 1, "right": 2}},
            {"leaf": {"value": [40000.0]}},
            {"leaf": {"value": [65000.0]}}
        ]
    }"#;

    const SCALER: &str = r#"{
        "type": "standard",
        "mean": [35.0, 5.0, 5.0, 0.5],
        "scale": [10.0, 2.0, 2.0, 0.5]
    }"#;

    fn write_pair(model: &str, scaler: &str) -> (TempDir, ArtifactsConfig) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("model.json"), model).unwrap();
        std::fs::write(dir.path().join("scaler.json"), scaler).unwrap();
        let config = ArtifactsConfig {
            model_path: PathBuf::from("model.json"),
            scaler_path: PathBuf::from("scaler.json"),
        };
        (dir, config)
    }

    #[test]
    fn test_load_and_predict() {
        let (dir, config) = write_pair(MODEL, SCALER);
        let artifacts = LoadedArtifacts::load(&config, dir.path()).unwrap();
        assert_eq!(artifacts.predictor().name(), "decision_tree_regressor");
        assert_eq!(artifacts.scaler().name(), "standard");
        assert_eq!(artifacts.model_path(), Some(dir.path().join("model.json").as_path()));

        // age 30 scales to -0.5, which is <= 0.0
        let young = InputRecord::from_values(["30", "7", "5", "1"]);
        assert_eq!(artifacts.predict(&young).unwrap().to_string(), "[40000.0]");

        let older = InputRecord::from_values(["50", "7", "5", "1"]);
        assert_eq!(artifacts.predict(&older).unwrap().to_string(), "[65000.0]");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let (dir, mut config) = write_pair(MODEL, SCALER);
        config.model_path = PathBuf::from("nope.json");
        let err = LoadedArtifacts::load(&config, dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
        assert!(err.path().ends_with("nope.json"));
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let (dir, config) = write_pair(MODEL, "\u{80}\u{2}pickle bytes");
        let err = LoadedArtifacts::load(&config, dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
        assert!(err.path().ends_with("scaler.json"));
    }

    #[test]
    fn test_invalid_artifact_is_fatal() {
        let (dir, config) = write_pair(
            r#"{"type": "decision_tree", "task": "regression", "n_features": 4, "nodes": []}"#,
            SCALER,
        );
        let err = LoadedArtifacts::load(&config, dir.path()).unwrap_err();
        match err {
            ArtifactError::Invalid { message, .. } => assert!(message.contains("no nodes")),
            other => panic!("expected invalid artifact, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_surfaces_at_predict_time() {
        let artifacts = LoadedArtifacts::from_parts(
            Box::new(LinearModel {
                coef: vec![1.0; 3],
                intercept: 0.0,
            }),
            Box::new(IdentityScaler { n_features: None }),
        );
        let record = InputRecord::from_values(["1", "2", "3", "4"]);
        let err = artifacts.predict(&record).unwrap_err();
        assert_eq!(err.kind(), "feature_mismatch");
    }
}
