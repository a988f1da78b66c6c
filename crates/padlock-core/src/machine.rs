//! The transition engine.
//!
//! [`Machine`] owns the current state, the DUT model, the table and the
//! hardware. [`Machine::fire`] is the only way to change any of them.
//!
//! # Fire sequence
//!
//! 1. Collect the candidates for `(state, trigger)`. None means
//!    `IllegalTrigger`.
//! 2. Evaluate guards in declaration order; the first pass wins. None
//!    passing means `GuardRejected`.
//! 3. Run the before-action against a copy of the DUT. On success the copy
//!    replaces the DUT; on failure it is dropped and nothing is committed.
//! 4. Commit the destination state.
//! 5. Run the after-action. A failure here leaves the commit in place.
//!
//! The engine has no clock and never retries. Follow-up triggers an action
//! asks for are returned in [`Fired::queued`] for the driver to fire.

use std::collections::VecDeque;

use serde::Serialize;

use crate::{
    action::{ActionContext, ActionPhase},
    dut::{DeviceProfile, Dut, ProfileError},
    error::FireError,
    hardware::{Hardware, TimingConfig},
    payload::Payload,
    snapshot::DutSnapshot,
    state::DeviceState,
    table::{Transition, TransitionTable},
    trigger::Trigger,
};

/// Number of transitions kept in [`Machine::history`].
pub const HISTORY_LIMIT: usize = 64;

/// A committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fired {
    /// Trigger fired.
    pub trigger: Trigger,
    /// State left.
    pub from: DeviceState,
    /// State entered.
    pub state: DeviceState,
    /// Position of the chosen record among the candidates for
    /// `(from, trigger)`.
    pub candidate: usize,
    /// Guard that passed, if the record was guarded.
    pub guard: Option<&'static str>,
    /// Triggers the actions asked the driver to fire next.
    pub queued: Vec<Trigger>,
}

/// Device behavior state machine.
pub struct Machine<H: Hardware> {
    state: DeviceState,
    dut: Dut,
    table: TransitionTable,
    timing: TimingConfig,
    hardware: H,
    history: VecDeque<Fired>,
}

impl<H: Hardware> Machine<H> {
    /// Factory-default device, powered off, with the device table.
    pub fn new(hardware: H) -> Self {
        Self::from_parts(DeviceState::Off, Dut::default(), hardware)
    }

    /// Factory-default device built for `profile`.
    pub fn with_profile(profile: DeviceProfile, hardware: H) -> Result<Self, ProfileError> {
        Ok(Self::from_parts(DeviceState::Off, Dut::new(profile)?, hardware))
    }

    /// Resumes from a snapshot.
    pub fn from_snapshot(snapshot: DutSnapshot, hardware: H) -> Self {
        Self::from_parts(snapshot.state, snapshot.dut, hardware)
    }

    fn from_parts(state: DeviceState, dut: Dut, hardware: H) -> Self {
        Self {
            state,
            dut,
            table: TransitionTable::device(),
            timing: TimingConfig::default(),
            hardware,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Replaces the transition table.
    #[must_use]
    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Replaces the hardware timings.
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Current state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// The DUT model.
    pub fn dut(&self) -> &Dut {
        &self.dut
    }

    /// Transition table in use.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Hardware timings in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// The hardware.
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// The hardware, mutably (scripting a test double between fires).
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Most recent committed transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Fired> {
        self.history.iter()
    }

    /// Current state and DUT.
    pub fn snapshot(&self) -> DutSnapshot {
        DutSnapshot { state: self.state, dut: self.dut.clone() }
    }

    /// Fires a trigger given by name. Unknown names are illegal triggers.
    pub fn fire_named(&mut self, name: &str, payload: &Payload) -> Result<Fired, FireError> {
        match name.parse::<Trigger>() {
            Ok(trigger) => self.fire(trigger, payload),
            Err(_) => {
                tracing::debug!(name, state = %self.state, "unknown trigger name");
                Err(FireError::IllegalTrigger { trigger: name.to_string(), state: self.state })
            },
        }
    }

    /// Fires `trigger` with `payload`.
    pub fn fire(&mut self, trigger: Trigger, payload: &Payload) -> Result<Fired, FireError> {
        let from = self.state;
        let (candidate, record) = self.select(trigger, payload)?;

        let mut queued = Vec::new();
        if let Some(action) = record.before {
            let mut scratch = self.dut.clone();
            let mut ctx = ActionContext::new(
                &mut scratch,
                &mut self.hardware,
                payload,
                &self.timing,
                trigger,
                from,
                record.dest,
                &mut queued,
            );
            if let Err(reason) = (action.run)(&mut ctx) {
                tracing::warn!(%trigger, state = %from, action = action.name, %reason, "before-action failed");
                return Err(FireError::ActionFailure {
                    trigger,
                    phase: ActionPhase::Before,
                    reason,
                    state: from,
                    committed: false,
                    snapshot: Box::new(self.snapshot()),
                });
            }
            self.dut = scratch;
        }

        self.state = record.dest;
        tracing::info!(%trigger, %from, to = %record.dest, guard = record.guard_name(), "transition");

        let after = record.after.map(|action| {
            let mut ctx = ActionContext::new(
                &mut self.dut,
                &mut self.hardware,
                payload,
                &self.timing,
                trigger,
                from,
                record.dest,
                &mut queued,
            );
            (action, (action.run)(&mut ctx))
        });

        let fired = Fired {
            trigger,
            from,
            state: record.dest,
            candidate,
            guard: record.guard_name(),
            queued,
        };
        self.remember(fired.clone());

        match after {
            Some((action, Err(reason))) => {
                tracing::warn!(%trigger, state = %self.state, action = action.name, %reason, "after-action failed");
                Err(FireError::ActionFailure {
                    trigger,
                    phase: ActionPhase::After,
                    reason,
                    state: self.state,
                    committed: true,
                    snapshot: Box::new(self.snapshot()),
                })
            },
            _ => Ok(fired),
        }
    }

    /// Picks the first candidate whose guard passes.
    fn select(&self, trigger: Trigger, payload: &Payload) -> Result<(usize, Transition), FireError> {
        let mut rejected = Vec::new();
        for (candidate, record) in self.table.candidates(self.state, trigger).enumerate() {
            let passes = record.passes(&self.dut, payload);
            tracing::debug!(%trigger, state = %self.state, candidate, guard = record.guard_name(), passes, "guard evaluated");
            if passes {
                return Ok((candidate, *record));
            }
            rejected.extend(record.guard_name());
        }

        if rejected.is_empty() {
            tracing::debug!(%trigger, state = %self.state, "illegal trigger");
            Err(FireError::IllegalTrigger { trigger: trigger.to_string(), state: self.state })
        } else {
            tracing::debug!(%trigger, state = %self.state, guards = ?rejected, "guards rejected");
            Err(FireError::GuardRejected { trigger, state: self.state, guards: rejected })
        }
    }

    fn remember(&mut self, fired: Fired) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(fired);
    }
}

impl<H: Hardware + std::fmt::Debug> std::fmt::Debug for Machine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("dut", &self.dut)
            .field("hardware", &self.hardware)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        action::{Action, ActionError},
        hardware::{HardwareError, Key, LedPattern, PowerState},
        table::Guard,
    };

    /// Confirms everything; optionally refuses one pattern.
    #[derive(Debug, Default)]
    struct Bench {
        refuse: Option<LedPattern>,
        keys: Vec<Key>,
    }

    impl Hardware for Bench {
        fn send_keys(&mut self, keys: &[Key]) -> Result<(), HardwareError> {
            self.keys.extend_from_slice(keys);
            Ok(())
        }

        fn press_key(&mut self, chord: &[Key], _hold: Duration) -> Result<(), HardwareError> {
            self.keys.extend_from_slice(chord);
            Ok(())
        }

        fn confirm_stable_indicator(
            &mut self,
            pattern: LedPattern,
            _minimum: Duration,
            _timeout: Duration,
        ) -> Result<bool, HardwareError> {
            Ok(self.refuse != Some(pattern))
        }

        fn await_indicator(
            &mut self,
            pattern: LedPattern,
            _timeout: Duration,
        ) -> Result<bool, HardwareError> {
            Ok(self.refuse != Some(pattern))
        }

        fn confirm_enumeration(&mut self, _timeout: Duration) -> Result<bool, HardwareError> {
            Ok(true)
        }

        fn power(&mut self, _state: PowerState) -> Result<(), HardwareError> {
            Ok(())
        }
    }

    fn booted() -> Machine<Bench> {
        let mut machine = Machine::new(Bench::default());
        let fired = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap();
        assert_eq!(fired.queued, vec![Trigger::PostPass]);
        machine.fire(Trigger::PostPass, &Payload::none()).unwrap();
        machine
    }

    #[test]
    fn factory_device_boots_to_oob() {
        let machine = booted();
        assert_eq!(machine.state(), DeviceState::Oob);
        assert_eq!(machine.history().count(), 2);
    }

    #[test]
    fn unknown_trigger_name_is_illegal() {
        let mut machine = booted();
        let err = machine.fire_named("open_sesame", &Payload::none()).unwrap_err();
        assert_eq!(
            err,
            FireError::IllegalTrigger { trigger: "open_sesame".into(), state: DeviceState::Oob }
        );
    }

    #[test]
    fn post_failure_is_queued_when_acceptance_is_missing() {
        let mut machine =
            Machine::new(Bench { refuse: Some(LedPattern::AcceptPattern), ..Bench::default() });
        let fired = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap();
        assert_eq!(fired.queued, vec![Trigger::PostFail]);
        machine.fire(Trigger::PostFail, &Payload::none()).unwrap();
        assert_eq!(machine.state(), DeviceState::Error);
    }

    #[test]
    fn before_failure_rolls_back_the_dut() {
        fn enroll_then_fail(ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
            ctx.dut_mut().enroll_admin_pin(crate::pin::Pin::new("1357924").unwrap());
            Err(ActionError::NotEnumerated)
        }
        let table = TransitionTable::new(vec![
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Standby)
                .before(Action::new("enroll_then_fail", enroll_then_fail)),
        ])
        .unwrap();
        let mut machine = Machine::new(Bench::default()).with_table(table);

        let err = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap_err();
        assert!(matches!(
            err,
            FireError::ActionFailure { phase: ActionPhase::Before, committed: false, .. }
        ));
        assert_eq!(machine.state(), DeviceState::Off);
        assert!(!machine.dut().has_admin_pin());
        assert_eq!(machine.history().count(), 0);
    }

    #[test]
    fn after_failure_keeps_the_commit() {
        let mut machine =
            Machine::new(Bench { refuse: Some(LedPattern::GreenBlueState), ..Bench::default() });
        machine.fire(Trigger::PowerOn, &Payload::none()).unwrap();
        let err = machine.fire(Trigger::PostPass, &Payload::none()).unwrap_err();
        let FireError::ActionFailure { phase, committed, state, snapshot, .. } = err else {
            panic!("expected an action failure, got {err:?}");
        };
        assert_eq!(phase, ActionPhase::After);
        assert!(committed);
        assert_eq!(state, DeviceState::Oob);
        assert_eq!(snapshot.state, DeviceState::Oob);
        assert_eq!(machine.state(), DeviceState::Oob);
    }

    #[test]
    fn guard_rejection_names_every_refusing_guard() {
        const NEVER: Guard = Guard::new("never", |_, _| false);
        const NOPE: Guard = Guard::new("nope", |_, _| false);
        let table = TransitionTable::new(vec![
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Post).guard(NEVER),
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Bricked)
                .guard(NOPE),
        ])
        .unwrap();
        let mut machine = Machine::new(Bench::default()).with_table(table);

        let err = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap_err();
        assert_eq!(
            err,
            FireError::GuardRejected {
                trigger: Trigger::PowerOn,
                state: DeviceState::Off,
                guards: vec!["never", "nope"],
            }
        );
    }

    #[test]
    fn history_is_bounded() {
        let mut machine = booted();
        for _ in 0..HISTORY_LIMIT {
            machine.fire(Trigger::EnterDiagnosticMode, &Payload::none()).unwrap();
            machine.fire(Trigger::ExitDiagnosticMode, &Payload::none()).unwrap();
        }
        assert_eq!(machine.history().count(), HISTORY_LIMIT);
        assert_eq!(machine.history().last().map(|f| f.state), Some(DeviceState::Oob));
    }
}
