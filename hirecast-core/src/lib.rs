//! # hirecast-core
//!
//! Loads a fitted model and feature scaler, collects the four form inputs
//! (age, healthy_eating, active_lifestyle, Gender), and renders a single
//! prediction. The terminal and HTTP front ends both go through
//! [`form::FormSession`].

pub mod artifacts;
pub mod config;
pub mod error;
pub mod form;
pub mod inference;
pub mod predictor;
pub mod render;
pub mod scaler;
pub mod server;

pub use artifacts::LoadedArtifacts;
pub use config::{ConfigOverrides, HirecastConfig, load_config};
pub use error::{ArtifactError, HirecastError, InferenceError};
pub use form::{FORM_FIELDS, FormSession, FormSource, FormSubmission, FormValues};
pub use inference::{FEATURE_NAMES, InputRecord, predict_record};
pub use predictor::{Prediction, Predictor};
pub use render::Rendered;
pub use scaler::Scaler;
