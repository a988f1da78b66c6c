//! Scenario files.
//!
//! A scenario is a named list of trigger steps with optional expectations:
//!
//! ```yaml
//! name: first admin enrollment
//! follow_queued: true
//! steps:
//!   - trigger: power_on
//!     expect: { state: OOB }
//!   - trigger: enroll_admin
//!   - trigger: enroll_pin
//!     payload: { new_pin: "1357924" }
//!     expect: { state: ADMIN_MODE, outcome: fired }
//! ```

use std::path::Path;

use padlock_core::{DeviceProfile, DeviceState, FireError, Payload};
use serde::{Deserialize, Serialize};

use crate::{dry_run::HardwareScript, error::RigError};

/// One scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Name used in logs and the report; defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,
    /// Device under test.
    #[serde(default)]
    pub profile: DeviceProfile,
    /// Fire follow-up triggers queued by actions.
    #[serde(default)]
    pub follow_queued: bool,
    /// Dry-run hardware answers.
    #[serde(default)]
    pub hardware: HardwareScript,
    /// Steps in order.
    pub steps: Vec<Step>,
}

/// One trigger to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Trigger name. Unknown names are reported as illegal triggers.
    pub trigger: String,
    /// Trigger arguments.
    #[serde(default)]
    pub payload: Payload,
    /// What must hold after the step.
    #[serde(default)]
    pub expect: Option<Expectation>,
}

/// Expected result of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectation {
    /// State after the step, including followed triggers.
    pub state: Option<DeviceState>,
    /// How the step's own trigger ended.
    pub outcome: Option<Outcome>,
    /// How every followed trigger ended; `fired` when absent.
    pub followed: Option<Outcome>,
}

/// How a fired trigger ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The transition committed and every action succeeded.
    Fired,
    /// No record for the trigger in the current state.
    IllegalTrigger,
    /// Every candidate's guard refused.
    GuardRejected,
    /// An action failed.
    ActionFailure,
}

impl Outcome {
    /// Outcome of a failed fire.
    pub fn of(error: &FireError) -> Self {
        match error {
            FireError::IllegalTrigger { .. } => Self::IllegalTrigger,
            FireError::GuardRejected { .. } => Self::GuardRejected,
            FireError::ActionFailure { .. } => Self::ActionFailure,
        }
    }
}

impl Scenario {
    /// Parses a scenario from YAML.
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, RigError> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|source| RigError::Parse { path: path.to_path_buf(), source })
    }

    /// Reads and parses a scenario file.
    pub fn load(path: &Path) -> Result<Self, RigError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|source| RigError::Read { path: path.to_path_buf(), source })?;
        let mut scenario = Self::from_yaml(&yaml, path)?;
        if scenario.name.is_none() {
            scenario.name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(scenario)
    }

    /// Display name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_uses_defaults() {
        let yaml = "steps:\n  - trigger: power_on\n";
        let scenario = Scenario::from_yaml(yaml, Path::new("inline.yaml")).unwrap();

        assert_eq!(scenario.profile, DeviceProfile::default());
        assert!(!scenario.follow_queued);
        assert_eq!(scenario.steps[0].payload, Payload::none());
        assert_eq!(scenario.steps[0].expect, None);
    }

    #[test]
    fn expectation_names_parse() {
        let yaml = "steps:\n  - trigger: unlock_admin\n    expect: { state: UNLOCKED_ADMIN, outcome: guard_rejected }\n";
        let scenario = Scenario::from_yaml(yaml, Path::new("inline.yaml")).unwrap();
        let expect = scenario.steps[0].expect.clone().unwrap();

        assert_eq!(expect.state, Some(DeviceState::UnlockedAdmin));
        assert_eq!(expect.outcome, Some(Outcome::GuardRejected));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let yaml = "steps: []\nsurprise: 1\n";
        let err = Scenario::from_yaml(yaml, Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, RigError::Parse { .. }));
    }
}
