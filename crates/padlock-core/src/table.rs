//! The declarative transition table.
//!
//! A table is an ordered list of [`Transition`] records. For a given
//! `(state, trigger)` the records whose source set contains `state` are the
//! candidates, evaluated in declaration order; the first whose guard passes
//! wins. The table is data: it can be listed, rendered as Graphviz and
//! queried without running anything.
//!
//! # Invariants
//!
//! - No record is unreachable: once an unguarded record covers a
//!   `(trigger, source)` pair, no later record may cover the same pair.
//!   [`TransitionTable::new`] rejects such tables.
//! - Every record names at least one source state.

use std::fmt::{self, Write as _};

use thiserror::Error;

use crate::{
    action::Action,
    dut::Dut,
    guards,
    handlers,
    payload::Payload,
    state::DeviceState,
    trigger::Trigger,
};

use DeviceState as S;

/// Guard signature.
pub type GuardFn = fn(&Dut, &Payload) -> bool;

/// A named guard predicate.
#[derive(Clone, Copy)]
pub struct Guard {
    /// Name reported by `GuardRejected` and shown in listings.
    pub name: &'static str,
    /// Predicate over the DUT and the trigger payload.
    pub check: GuardFn,
}

impl Guard {
    /// Wraps a predicate.
    pub const fn new(name: &'static str, check: GuardFn) -> Self {
        Self { name, check }
    }

    /// Evaluates the predicate.
    pub fn passes(&self, dut: &Dut, payload: &Payload) -> bool {
        (self.check)(dut, payload)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guard").field(&self.name).finish()
    }
}

/// One transition record.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    /// Trigger that selects this record.
    pub trigger: Trigger,
    /// States the record applies in.
    pub sources: &'static [DeviceState],
    /// State entered when the record fires.
    pub dest: DeviceState,
    /// Optional guard; an unguarded record always passes.
    pub guard: Option<Guard>,
    /// Runs before the state is committed.
    pub before: Option<Action>,
    /// Runs after the state is committed.
    pub after: Option<Action>,
}

impl Transition {
    /// An unguarded record with no actions.
    pub const fn new(
        trigger: Trigger,
        sources: &'static [DeviceState],
        dest: DeviceState,
    ) -> Self {
        Self { trigger, sources, dest, guard: None, before: None, after: None }
    }

    /// Sets the guard.
    #[must_use]
    pub const fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Sets the before-action.
    #[must_use]
    pub const fn before(mut self, action: Action) -> Self {
        self.before = Some(action);
        self
    }

    /// Sets the after-action.
    #[must_use]
    pub const fn after(mut self, action: Action) -> Self {
        self.after = Some(action);
        self
    }

    /// Whether `state` is one of the record's sources.
    pub fn applies_to(&self, state: DeviceState) -> bool {
        self.sources.contains(&state)
    }

    /// Guard name, if the record is guarded.
    pub fn guard_name(&self) -> Option<&'static str> {
        self.guard.map(|guard| guard.name)
    }

    /// Whether the record passes for this DUT and payload.
    pub fn passes(&self, dut: &Dut, payload: &Payload) -> bool {
        self.guard.is_none_or(|guard| guard.passes(dut, payload))
    }
}

/// A table that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A record has no source states.
    #[error("record {index} ({trigger}) has no source states")]
    NoSources {
        /// Position of the record.
        index: usize,
        /// Its trigger.
        trigger: Trigger,
    },

    /// A record can never be selected from `state`.
    #[error(
        "record {index} ({trigger} from {state}) is shadowed by unguarded record {shadowed_by}"
    )]
    ShadowedCandidate {
        /// Trigger of the unreachable record.
        trigger: Trigger,
        /// Source state it is unreachable from.
        state: DeviceState,
        /// Position of the unreachable record.
        index: usize,
        /// Position of the unguarded record covering it.
        shadowed_by: usize,
    },
}

/// An ordered list of transition records.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
}

impl TransitionTable {
    /// Builds a table after checking its invariants.
    pub fn new(transitions: Vec<Transition>) -> Result<Self, TableError> {
        let table = Self { transitions };
        table.validate()?;
        Ok(table)
    }

    /// Checks that every record has sources and is reachable.
    pub fn validate(&self) -> Result<(), TableError> {
        for (index, record) in self.transitions.iter().enumerate() {
            if record.sources.is_empty() {
                return Err(TableError::NoSources { index, trigger: record.trigger });
            }
            for &source in record.sources {
                let shadowing = self.transitions[..index].iter().position(|earlier| {
                    earlier.trigger == record.trigger
                        && earlier.guard.is_none()
                        && earlier.applies_to(source)
                });
                if let Some(shadowed_by) = shadowing {
                    return Err(TableError::ShadowedCandidate {
                        trigger: record.trigger,
                        state: source,
                        index,
                        shadowed_by,
                    });
                }
            }
        }
        Ok(())
    }

    /// All records in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Records that apply to `trigger` in `state`, in evaluation order.
    pub fn candidates(
        &self,
        state: DeviceState,
        trigger: Trigger,
    ) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .iter()
            .filter(move |record| record.trigger == trigger && record.applies_to(state))
    }

    /// Whether `trigger` is valid at all in `state`.
    pub fn is_defined(&self, state: DeviceState, trigger: Trigger) -> bool {
        self.candidates(state, trigger).next().is_some()
    }

    /// Triggers valid in `state`, in first-declaration order.
    pub fn triggers_from(&self, state: DeviceState) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        for record in self.transitions.iter().filter(|record| record.applies_to(state)) {
            if !triggers.contains(&record.trigger) {
                triggers.push(record.trigger);
            }
        }
        triggers
    }

    /// One line per record: index, trigger, sources, guard, destination and
    /// actions.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (index, record) in self.transitions.iter().enumerate() {
            let sources: Vec<&str> = record.sources.iter().map(|s| s.as_str()).collect();
            let _ = write!(out, "{index}: {} [{}]", record.trigger, sources.join(", "));
            if let Some(guard) = record.guard_name() {
                let _ = write!(out, " if {guard}");
            }
            let _ = write!(out, " -> {}", record.dest);
            if let Some(before) = record.before {
                let _ = write!(out, " before={}", before.name);
            }
            if let Some(after) = record.after {
                let _ = write!(out, " after={}", after.name);
            }
            out.push('\n');
        }
        out
    }

    /// Graphviz rendering, one edge per (record, source).
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph padlock {\n    rankdir=LR;\n");
        for record in &self.transitions {
            let label = match record.guard_name() {
                Some(guard) => format!("{} [{guard}]", record.trigger),
                None => record.trigger.to_string(),
            };
            for source in record.sources {
                let _ = writeln!(
                    out,
                    "    \"{source}\" -> \"{}\" [label=\"{label}\"];",
                    record.dest
                );
            }
        }
        out.push_str("}\n");
        out
    }

    /// The device table.
    pub fn device() -> Self {
        Self { transitions: device_transitions() }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::device()
    }
}

const ALL_BUT_OFF: &[DeviceState] = &[
    S::Post,
    S::Oob,
    S::Standby,
    S::UserForcedEnrollment,
    S::UnlockedAdmin,
    S::UnlockedUser,
    S::AdminMode,
    S::PinEnrollment,
    S::CounterEnrollment,
    S::Diagnostic,
    S::BruteForce,
    S::Bricked,
    S::Error,
];

const RUNNING: &[DeviceState] = &[
    S::Post,
    S::Oob,
    S::Standby,
    S::UserForcedEnrollment,
    S::UnlockedAdmin,
    S::UnlockedUser,
    S::AdminMode,
    S::PinEnrollment,
    S::CounterEnrollment,
    S::Diagnostic,
    S::BruteForce,
];

const LOCKED: &[DeviceState] = &[S::Standby, S::UserForcedEnrollment];
const IDLE: &[DeviceState] = &[S::Oob, S::Standby, S::UserForcedEnrollment];
const RESETTABLE: &[DeviceState] = &[S::Oob, S::Standby, S::UserForcedEnrollment, S::BruteForce];

/// Records for the four ways out of a failed unlock from `source`.
fn fail_unlock(source: &'static [DeviceState], same: DeviceState) -> [Transition; 4] {
    let t = Trigger::FailUnlock;
    [
        Transition::new(t, source, S::BruteForce)
            .guard(guards::LAST_TRY_SPENT_WITH_PROVISION_LOCK)
            .before(handlers::FAIL_LAST_TRY_LOCKED)
            .after(handlers::CONFIRM_ARRIVAL),
        Transition::new(t, source, S::Oob)
            .guard(guards::LAST_TRY_SPENT)
            .before(handlers::FAIL_LAST_TRY_RESET)
            .after(handlers::CONFIRM_ARRIVAL),
        Transition::new(t, source, S::BruteForce)
            .guard(guards::FAILURE_REACHES_MIDPOINT)
            .before(handlers::ENTER_WRONG_PIN)
            .after(handlers::CONFIRM_ARRIVAL),
        Transition::new(t, source, same).before(handlers::ENTER_WRONG_PIN),
    ]
}

/// Leaving PIN enrollment without storing a PIN.
fn leave_pin_enrollment(trigger: Trigger, before: Action) -> [Transition; 2] {
    let src: &[DeviceState] = &[S::PinEnrollment];
    [
        Transition::new(trigger, src, S::Oob)
            .guard(guards::NO_ADMIN_PIN)
            .before(before)
            .after(handlers::CONFIRM_ARRIVAL),
        Transition::new(trigger, src, S::AdminMode)
            .before(before)
            .after(handlers::CONFIRM_ARRIVAL),
    ]
}

/// An admin-mode self-loop.
fn admin_toggle(trigger: Trigger, guard: Option<Guard>, action: Action) -> Transition {
    let record = Transition::new(trigger, &[S::AdminMode], S::AdminMode)
        .before(action)
        .after(handlers::CONFIRM_ARRIVAL);
    match guard {
        Some(guard) => record.guard(guard),
        None => record,
    }
}

fn device_transitions() -> Vec<Transition> {
    use handlers as h;
    use Trigger as T;

    let arrive = h::CONFIRM_ARRIVAL;
    let mut table = vec![
        // Power and self test
        Transition::new(T::PowerOn, &[S::Off], S::Bricked)
            .guard(guards::BRICKED)
            .before(h::POWER_UP),
        Transition::new(T::PowerOn, &[S::Off], S::Post)
            .before(h::POWER_UP)
            .after(h::POST_RESULT),
        Transition::new(T::PowerOff, ALL_BUT_OFF, S::Off).before(h::POWER_DOWN).after(arrive),
        Transition::new(T::PostPass, &[S::Post], S::BruteForce)
            .guard(guards::BRUTE_FORCE_LOCKED)
            .after(arrive),
        Transition::new(T::PostPass, &[S::Post], S::UserForcedEnrollment)
            .guard(guards::USER_FORCED_ENROLLMENT)
            .after(arrive),
        Transition::new(T::PostPass, &[S::Post], S::Oob).guard(guards::NO_ADMIN_PIN).after(arrive),
        Transition::new(T::PostPass, &[S::Post], S::Standby)
            .guard(guards::HAS_ADMIN_PIN)
            .after(arrive),
        Transition::new(T::PostFail, &[S::Post], S::Error).after(arrive),
        Transition::new(T::CriticalError, RUNNING, S::Error).after(arrive),
        // Diagnostics
        Transition::new(T::EnterDiagnosticMode, IDLE, S::Diagnostic).after(arrive),
        Transition::new(T::ExitDiagnosticMode, &[S::Diagnostic], S::UserForcedEnrollment)
            .guard(guards::USER_FORCED_ENROLLMENT)
            .before(h::PRESS_LOCK)
            .after(arrive),
        Transition::new(T::ExitDiagnosticMode, &[S::Diagnostic], S::Oob)
            .guard(guards::NO_ADMIN_PIN)
            .before(h::PRESS_LOCK)
            .after(arrive),
        Transition::new(T::ExitDiagnosticMode, &[S::Diagnostic], S::Standby)
            .guard(guards::HAS_ADMIN_PIN)
            .before(h::PRESS_LOCK)
            .after(arrive),
        // Resets
        Transition::new(T::EnrollAdmin, &[S::Oob], S::PinEnrollment)
            .before(h::BEGIN_ADMIN_ENROLLMENT)
            .after(arrive),
        Transition::new(T::UserReset, RESETTABLE, S::Oob)
            .guard(guards::PROVISION_LOCK_INACTIVE)
            .before(h::USER_RESET)
            .after(arrive),
        Transition::new(T::UserReset, &[S::AdminMode], S::Oob).before(h::USER_RESET).after(arrive),
        // Unlocking
        Transition::new(T::AdminModeLogin, LOCKED, S::AdminMode)
            .before(h::ADMIN_LOGIN)
            .after(arrive),
        Transition::new(T::UnlockAdmin, LOCKED, S::UnlockedAdmin)
            .before(h::ENTER_ADMIN_PIN)
            .after(arrive),
        Transition::new(T::UnlockUser, LOCKED, S::UnlockedUser)
            .guard(guards::USER_SLOT_ENROLLED)
            .before(h::ENTER_USER_PIN)
            .after(arrive),
        Transition::new(T::SelfDestruct, LOCKED, S::UnlockedAdmin)
            .guard(guards::SELF_DESTRUCT_ACTIVE)
            .before(h::ENTER_SELF_DESTRUCT_PIN)
            .after(arrive),
        Transition::new(T::LockAdmin, &[S::AdminMode, S::UnlockedAdmin], S::UserForcedEnrollment)
            .guard(guards::USER_FORCED_ENROLLMENT)
            .before(h::PRESS_LOCK)
            .after(arrive),
        Transition::new(T::LockAdmin, &[S::AdminMode, S::UnlockedAdmin], S::Standby)
            .before(h::PRESS_LOCK)
            .after(arrive),
        Transition::new(T::LockUser, &[S::UnlockedUser], S::UserForcedEnrollment)
            .guard(guards::USER_FORCED_ENROLLMENT)
            .before(h::PRESS_LOCK)
            .after(arrive),
        Transition::new(T::LockUser, &[S::UnlockedUser], S::Standby)
            .before(h::PRESS_LOCK)
            .after(arrive),
    ];

    // Brute force
    table.extend(fail_unlock(&[S::Standby], S::Standby));
    table.extend(fail_unlock(&[S::UserForcedEnrollment], S::UserForcedEnrollment));
    table.extend([
        Transition::new(T::LastTryLogin, &[S::BruteForce], S::UserForcedEnrollment)
            .guard(guards::LAST_TRY_AVAILABLE_WITH_UFE)
            .before(h::ENTER_LAST_TRY)
            .after(arrive),
        Transition::new(T::LastTryLogin, &[S::BruteForce], S::Standby)
            .guard(guards::LAST_TRY_AVAILABLE)
            .before(h::ENTER_LAST_TRY)
            .after(arrive),
        Transition::new(T::AdminRecoveryLogin, &[S::BruteForce], S::PinEnrollment)
            .guard(guards::RECOVERY_PIN_MATCHES)
            .before(h::RECOVERY_LOGIN)
            .after(arrive),
        Transition::new(T::FailAdminRecovery, &[S::BruteForce], S::Bricked)
            .guard(guards::RECOVERY_ATTEMPTS_EXHAUSTED_NEXT)
            .before(h::FAIL_RECOVERY_AND_BRICK),
        Transition::new(T::FailAdminRecovery, &[S::BruteForce], S::BruteForce)
            .guard(guards::AWAITING_ADMIN_RECOVERY)
            .before(h::FAIL_RECOVERY)
            .after(arrive),
    ]);

    // PIN enrollment
    table.extend([
        Transition::new(T::EnrollUser, &[S::UserForcedEnrollment], S::Standby)
            .guard(guards::FORCED_ENROLLMENT_ACCEPTABLE)
            .before(h::FORCED_USER_ENROLLMENT)
            .after(arrive),
        Transition::new(T::EnrollUser, &[S::UserForcedEnrollment], S::UserForcedEnrollment)
            .guard(guards::FORCED_ENROLLMENT_REJECTED)
            .before(h::FORCED_USER_ENROLLMENT_REJECTED)
            .after(arrive),
        Transition::new(T::EnrollUser, &[S::AdminMode], S::PinEnrollment)
            .guard(guards::EMPTY_USER_SLOT)
            .before(h::BEGIN_USER_ENROLLMENT)
            .after(arrive),
        Transition::new(T::EnrollRecovery, &[S::AdminMode], S::PinEnrollment)
            .guard(guards::EMPTY_RECOVERY_SLOT)
            .before(h::BEGIN_RECOVERY_ENROLLMENT)
            .after(arrive),
        Transition::new(T::EnrollSelfDestruct, &[S::AdminMode], S::PinEnrollment)
            .guard(guards::SELF_DESTRUCT_ENABLED)
            .before(h::BEGIN_SELF_DESTRUCT_ENROLLMENT)
            .after(arrive),
        Transition::new(T::EnrollPin, &[S::PinEnrollment], S::AdminMode)
            .guard(guards::ENROLLMENT_ACCEPTABLE)
            .before(h::STORE_ENROLLED_PIN)
            .after(arrive),
        Transition::new(T::EnrollPin, &[S::PinEnrollment], S::Oob)
            .guard(guards::FIRST_ADMIN_REJECTED)
            .before(h::REJECT_ENROLLED_PIN)
            .after(arrive),
        Transition::new(T::EnrollPin, &[S::PinEnrollment], S::AdminMode)
            .guard(guards::NEW_PIN_SUPPLIED)
            .before(h::REJECT_ENROLLED_PIN)
            .after(arrive),
    ]);
    table.extend(leave_pin_enrollment(T::TimeoutEnrollPin, h::PIN_ENROLLMENT_TIMED_OUT));
    table.extend(leave_pin_enrollment(T::ExitEnrollPin, h::CANCEL_PIN_ENROLLMENT));

    // Counter enrollment
    table.extend([
        Transition::new(T::EnrollBruteForceCounter, &[S::AdminMode], S::CounterEnrollment)
            .before(h::BEGIN_BRUTE_FORCE_COUNTER),
        Transition::new(T::EnrollMinPinCounter, &[S::AdminMode], S::CounterEnrollment)
            .before(h::BEGIN_MIN_PIN_COUNTER),
        Transition::new(T::EnrollUnattendedAutoLockCounter, &[S::AdminMode], S::CounterEnrollment)
            .before(h::BEGIN_AUTO_LOCK_COUNTER),
        Transition::new(T::EnrollCounter, &[S::CounterEnrollment], S::AdminMode)
            .guard(guards::COUNTER_ACCEPTABLE)
            .before(h::STORE_COUNTER)
            .after(arrive),
        Transition::new(T::EnrollCounter, &[S::CounterEnrollment], S::AdminMode)
            .guard(guards::NEW_COUNTER_SUPPLIED)
            .before(h::REJECT_COUNTER)
            .after(arrive),
        Transition::new(T::TimeoutEnrollCounter, &[S::CounterEnrollment], S::AdminMode)
            .before(h::COUNTER_ENROLLMENT_TIMED_OUT)
            .after(arrive),
        Transition::new(T::ExitEnrollCounter, &[S::CounterEnrollment], S::AdminMode)
            .before(h::CANCEL_COUNTER_ENROLLMENT)
            .after(arrive),
    ]);

    // Admin mode toggles
    table.extend([
        admin_toggle(T::ToggleBasicDisk, None, h::TOGGLE_BASIC_DISK),
        admin_toggle(T::ToggleRemovableMedia, None, h::TOGGLE_REMOVABLE_MEDIA),
        admin_toggle(T::EnableLedFlicker, None, h::ENABLE_LED_FLICKER),
        admin_toggle(T::DisableLedFlicker, None, h::DISABLE_LED_FLICKER),
        admin_toggle(T::ToggleLockOverride, None, h::TOGGLE_LOCK_OVERRIDE),
        admin_toggle(T::ToggleReadOnly, None, h::SET_READ_ONLY),
        admin_toggle(T::ToggleReadWrite, None, h::SET_READ_WRITE),
        admin_toggle(
            T::ToggleProvisionLock,
            Some(guards::SELF_DESTRUCT_INACTIVE),
            h::TOGGLE_PROVISION_LOCK,
        ),
        admin_toggle(
            T::EnableSelfDestruct,
            Some(guards::PROVISION_LOCK_INACTIVE),
            h::ENABLE_SELF_DESTRUCT,
        ),
        admin_toggle(
            T::ToggleUserForcedEnrollment,
            Some(guards::FORCED_ENROLLMENT_ARMABLE),
            h::ARM_FORCED_ENROLLMENT,
        ),
        admin_toggle(T::DeletePins, Some(guards::FORCED_ENROLLMENT_INACTIVE), h::DELETE_PINS),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_table_is_valid() {
        let table = TransitionTable::device();
        assert!(table.validate().is_ok());
        assert!(!table.is_empty());
    }

    #[test]
    fn every_trigger_is_defined_somewhere() {
        let table = TransitionTable::device();
        for &trigger in Trigger::ALL {
            assert!(
                DeviceState::ALL.iter().any(|&state| table.is_defined(state, trigger)),
                "{trigger} has no record"
            );
        }
    }

    #[test]
    fn post_pass_candidates_follow_declaration_order() {
        let table = TransitionTable::device();
        let guards: Vec<_> = table
            .candidates(DeviceState::Post, Trigger::PostPass)
            .filter_map(Transition::guard_name)
            .collect();
        assert_eq!(
            guards,
            ["brute_force_locked", "user_forced_enrollment", "no_admin_pin", "has_admin_pin"]
        );
    }

    #[test]
    fn bricked_only_powers_off() {
        let table = TransitionTable::device();
        assert_eq!(table.triggers_from(DeviceState::Bricked), vec![Trigger::PowerOff]);
        assert_eq!(table.triggers_from(DeviceState::Off), vec![Trigger::PowerOn]);
    }

    #[test]
    fn shadowed_record_is_rejected() {
        let result = TransitionTable::new(vec![
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Post),
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Bricked)
                .guard(guards::BRICKED),
        ]);
        let err = result.unwrap_err();
        assert_eq!(
            err,
            TableError::ShadowedCandidate {
                trigger: Trigger::PowerOn,
                state: DeviceState::Off,
                index: 1,
                shadowed_by: 0,
            }
        );
        assert_eq!(
            err.to_string(),
            "record 1 (power_on from OFF) is shadowed by unguarded record 0"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn record_without_sources_is_rejected() {
        let result = TransitionTable::new(vec![Transition::new(
            Trigger::PowerOff,
            &[],
            DeviceState::Off,
        )]);
        assert!(matches!(result, Err(TableError::NoSources { index: 0, .. })));
    }

    #[test]
    fn listing_and_dot_for_small_table() {
        let table = TransitionTable::new(vec![
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Bricked)
                .guard(guards::BRICKED)
                .before(handlers::POWER_UP),
            Transition::new(Trigger::PowerOn, &[DeviceState::Off], DeviceState::Post)
                .before(handlers::POWER_UP)
                .after(handlers::POST_RESULT),
        ])
        .unwrap();

        insta::assert_snapshot!(table.listing(), @r"
        0: power_on [OFF] if bricked -> BRICKED before=power_up
        1: power_on [OFF] -> POST before=power_up after=post_result
        ");
        insta::assert_snapshot!(table.to_dot(), @r#"
        digraph padlock {
            rankdir=LR;
            "OFF" -> "BRICKED" [label="power_on [bricked]"];
            "OFF" -> "POST" [label="power_on"];
        }
        "#);
    }
}
