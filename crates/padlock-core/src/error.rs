//! Error types returned by [`Machine::fire`](crate::Machine::fire).

use thiserror::Error;

use crate::{
    action::{ActionError, ActionPhase},
    snapshot::DutSnapshot,
    state::DeviceState,
    trigger::Trigger,
};

/// Why a trigger did not produce a clean transition.
///
/// BRICKED and ERROR are states the machine can reach, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    /// No record accepts the trigger in the current state. Nothing changed.
    #[error("trigger `{trigger}` is not valid in {state}")]
    IllegalTrigger {
        /// Trigger as the driver named it.
        trigger: String,
        /// State the machine is in.
        state: DeviceState,
    },

    /// Records exist for the trigger but every guard refused. Nothing
    /// changed.
    #[error("trigger `{trigger}` rejected in {state} by guards ({})", .guards.join(", "))]
    GuardRejected {
        /// Trigger fired.
        trigger: Trigger,
        /// State the machine is in.
        state: DeviceState,
        /// Names of the rejecting guards, in evaluation order.
        guards: Vec<&'static str>,
    },

    /// An action failed.
    ///
    /// Before the commit the DUT is restored and `committed` is false. After
    /// the commit the new state stands, `committed` is true and `state` is
    /// the state entered.
    #[error("{phase}-action of `{trigger}` failed in {state}: {reason}")]
    ActionFailure {
        /// Trigger fired.
        trigger: Trigger,
        /// Which action failed.
        phase: ActionPhase,
        /// What went wrong.
        reason: ActionError,
        /// State the machine is in now.
        state: DeviceState,
        /// Whether the transition was committed.
        committed: bool,
        /// Machine snapshot at the time of the failure.
        snapshot: Box<DutSnapshot>,
    },
}

impl FireError {
    /// Returns true if the machine is exactly as it was before the fire.
    ///
    /// Illegal and rejected triggers change nothing. A before-action failure
    /// also leaves the model untouched, but the device may have seen key
    /// presses, so it is not treated as recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IllegalTrigger { .. } | Self::GuardRejected { .. })
    }

    /// State the machine is in after the failed fire.
    pub fn state(&self) -> DeviceState {
        match self {
            Self::IllegalTrigger { state, .. }
            | Self::GuardRejected { state, .. }
            | Self::ActionFailure { state, .. } => *state,
        }
    }

    /// Short outcome name used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IllegalTrigger { .. } => "illegal_trigger",
            Self::GuardRejected { .. } => "guard_rejected",
            Self::ActionFailure { .. } => "action_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dut::Dut, hardware::LedPattern};

    #[test]
    fn rejected_guards_are_listed() {
        let err = FireError::GuardRejected {
            trigger: Trigger::EnableSelfDestruct,
            state: DeviceState::AdminMode,
            guards: vec!["provision_lock_inactive"],
        };
        assert_eq!(
            err.to_string(),
            "trigger `enable_self_destruct` rejected in ADMIN_MODE by guards (provision_lock_inactive)"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn action_failure_is_not_recoverable() {
        let err = FireError::ActionFailure {
            trigger: Trigger::LockAdmin,
            phase: ActionPhase::After,
            reason: ActionError::Unconfirmed { pattern: LedPattern::StandbyMode },
            state: DeviceState::Standby,
            committed: true,
            snapshot: Box::new(DutSnapshot { state: DeviceState::Standby, dut: Dut::default() }),
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.state(), DeviceState::Standby);
        assert_eq!(
            err.to_string(),
            "after-action of `lock_admin` failed in STANDBY: LED pattern STANDBY_MODE not confirmed"
        );
    }
}
