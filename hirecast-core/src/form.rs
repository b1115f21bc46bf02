//! Form collector and the per-cycle state machine.
//!
//! Front ends (terminal prompts, HTTP form posts) implement [`FormSource`].
//! A [`FormSession`] pulls one [`FormSubmission`] per interaction cycle and
//! runs the inference adapter only when the trigger fired.

use crate::artifacts::LoadedArtifacts;
use crate::inference::{FEATURE_NAMES, InputRecord};
use crate::render::{Rendered, render};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A labeled text input bound to one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
}

/// The form's inputs, in feature order.
pub const FORM_FIELDS: [FormField; 4] = [
    FormField {
        key: FEATURE_NAMES[0],
        label: "AGE",
    },
    FormField {
        key: FEATURE_NAMES[1],
        label: "healthy_eating",
    },
    FormField {
        key: FEATURE_NAMES[2],
        label: "active_lifestyle",
    },
    FormField {
        key: FEATURE_NAMES[3],
        label: "Gender",
    },
];

/// Current text of every input. Untouched inputs hold an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub healthy_eating: String,
    #[serde(default)]
    pub active_lifestyle: String,
    #[serde(default, rename = "Gender")]
    pub gender: String,
}

impl FormValues {
    /// Value bound to `key`, if it names a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "age" => Some(self.age.as_str()),
            "healthy_eating" => Some(self.healthy_eating.as_str()),
            "active_lifestyle" => Some(self.active_lifestyle.as_str()),
            "Gender" => Some(self.gender.as_str()),
            _ => None,
        }
    }

    /// Bind `value` to `key`. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "age" => &mut self.age,
            "healthy_eating" => &mut self.healthy_eating,
            "active_lifestyle" => &mut self.active_lifestyle,
            "Gender" => &mut self.gender,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    /// Snapshot the inputs as an input record, no validation.
    pub fn to_record(&self) -> InputRecord {
        InputRecord::from_values([
            self.age.as_str(),
            self.healthy_eating.as_str(),
            self.active_lifestyle.as_str(),
            self.gender.as_str(),
        ])
    }
}

/// What the front end reports for one interaction cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pub values: FormValues,
    pub triggered: bool,
}

/// An external UI that yields the form state once per cycle.
pub trait FormSource {
    type Error;

    /// Wait for the next interaction. `Ok(None)` means the user left.
    fn next_cycle(&mut self) -> Result<Option<FormSubmission>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Waiting for the trigger.
    Idle,
    /// Trigger fired; a record is waiting to be predicted and rendered.
    Computing,
}

/// Drives cycles against the loaded artifacts.
pub struct FormSession<'a> {
    artifacts: &'a LoadedArtifacts,
    pending: Option<InputRecord>,
}

impl<'a> FormSession<'a> {
    pub fn new(artifacts: &'a LoadedArtifacts) -> Self {
        Self {
            artifacts,
            pending: None,
        }
    }

    pub fn phase(&self) -> FormPhase {
        if self.pending.is_some() {
            FormPhase::Computing
        } else {
            FormPhase::Idle
        }
    }

    /// Idle -> Computing when the trigger fired. A submission arriving while
    /// a computation is pending replaces it.
    pub fn submit(&mut self, submission: &FormSubmission) -> FormPhase {
        if submission.triggered {
            self.pending = Some(submission.values.to_record());
            debug!(phase = ?FormPhase::Computing, "Form triggered");
        }
        self.phase()
    }

    /// Computing -> Idle: predict the pending record and render the outcome.
    /// Returns `None` when idle.
    pub fn complete(&mut self) -> Option<Rendered> {
        let record = self.pending.take()?;
        let rendered = render(self.artifacts.predict(&record));
        debug!(
            phase = ?FormPhase::Idle,
            success = rendered.is_success(),
            "Form rendered"
        );
        Some(rendered)
    }

    /// Handle one cycle. Renders only when the trigger fired.
    pub fn run_cycle(&mut self, submission: &FormSubmission) -> Option<Rendered> {
        if !submission.triggered {
            return None;
        }
        self.submit(submission);
        self.complete()
    }

    /// Pull cycles from `source` until it closes, handing each render to
    /// `on_render`. Returns the number of triggered cycles.
    pub fn drive<S: FormSource>(
        &mut self,
        source: &mut S,
        mut on_render: impl FnMut(&Rendered),
    ) -> Result<usize, S::Error> {
        let mut triggered = 0;
        while let Some(submission) = source.next_cycle()? {
            if let Some(rendered) = self.run_cycle(&submission) {
                triggered += 1;
                on_render(&rendered);
            }
        }
        Ok(triggered)
    }
}
