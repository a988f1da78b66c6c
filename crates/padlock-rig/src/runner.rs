//! Scenario execution.

use padlock_core::{DeviceState, Machine, Payload, Trigger};
use serde::Serialize;

use crate::{
    RigConfig,
    dry_run::DryRunHardware,
    error::RigError,
    scenario::{Outcome, Scenario, Step},
};

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub index: usize,
    /// Trigger name as written.
    pub trigger: String,
    /// How the step's trigger ended.
    pub outcome: Outcome,
    /// State after the step.
    pub state: DeviceState,
    /// Error message for a failed fire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Queued triggers that were fired after the step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub followed: Vec<FollowedTrigger>,
    /// Expectations that did not hold.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<String>,
}

impl StepReport {
    /// Every expectation held.
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// A queued trigger fired on the step's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowedTrigger {
    /// The queued trigger.
    pub trigger: Trigger,
    /// How it ended.
    pub outcome: Outcome,
    /// Error message for a failed fire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Every step's expectations held.
    pub passed: bool,
    /// Steps run; stops at the first failure unless configured otherwise.
    pub steps: Vec<StepReport>,
    /// State after the last step run.
    pub final_state: DeviceState,
    /// Final DUT model, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<serde_json::Value>,
}

/// Runs `scenario` against a fresh machine on dry-run hardware.
pub fn run_scenario(scenario: &Scenario, config: &RigConfig) -> Result<ScenarioReport, RigError> {
    let name = scenario.display_name().to_string();
    if scenario.steps.is_empty() {
        return Err(RigError::Empty { scenario: name });
    }

    let hardware = DryRunHardware::new(&scenario.hardware);
    let mut machine = Machine::with_profile(scenario.profile.clone(), hardware)
        .map_err(|source| RigError::Profile { scenario: name.clone(), source })?;
    tracing::info!(scenario = %name, steps = scenario.steps.len(), "running scenario");

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let report = run_step(&mut machine, index, step, scenario.follow_queued);
        let passed = report.passed();
        if !passed {
            tracing::warn!(scenario = %name, index, mismatches = ?report.mismatches, "step failed");
        }
        steps.push(report);
        if !passed && !config.keep_going {
            break;
        }
    }

    let snapshot = if config.include_snapshot {
        Some(serde_json::to_value(machine.snapshot())?)
    } else {
        None
    };
    tracing::debug!(calls = machine.hardware().calls(), "hardware calls");

    Ok(ScenarioReport {
        passed: steps.iter().all(StepReport::passed),
        name,
        steps,
        final_state: machine.state(),
        snapshot,
    })
}

fn run_step(
    machine: &mut Machine<DryRunHardware>,
    index: usize,
    step: &Step,
    follow_queued: bool,
) -> StepReport {
    let (outcome, error, mut queued) = match machine.fire_named(&step.trigger, &step.payload) {
        Ok(fired) => (Outcome::Fired, None, fired.queued),
        Err(err) => (Outcome::of(&err), Some(err.to_string()), Vec::new()),
    };

    let mut followed = Vec::new();
    if follow_queued {
        while !queued.is_empty() {
            let trigger = queued.remove(0);
            let (outcome, error) = match machine.fire(trigger, &Payload::none()) {
                Ok(fired) => {
                    queued.extend(fired.queued);
                    (Outcome::Fired, None)
                },
                Err(err) => {
                    tracing::warn!(%trigger, %err, "queued trigger failed");
                    (Outcome::of(&err), Some(err.to_string()))
                },
            };
            followed.push(FollowedTrigger { trigger, outcome, error });
        }
    }

    let state = machine.state();
    let expect = step.expect.clone().unwrap_or_default();
    let mut mismatches = Vec::new();
    if let Some(want) = expect.outcome.filter(|want| *want != outcome) {
        mismatches.push(format!("outcome: expected {want:?}, got {outcome:?}"));
    }
    if let Some(want) = expect.state.filter(|want| *want != state) {
        mismatches.push(format!("state: expected {want}, got {state}"));
    }
    // Followed triggers must fire cleanly unless the step says otherwise.
    let want_followed = expect.followed.unwrap_or(Outcome::Fired);
    for follow in followed.iter().filter(|follow| follow.outcome != want_followed) {
        mismatches.push(format!(
            "followed {}: expected {want_followed:?}, got {:?}",
            follow.trigger, follow.outcome
        ));
    }

    StepReport { index, trigger: step.trigger.clone(), outcome, state, error, followed, mismatches }
}
