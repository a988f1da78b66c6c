//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! machine behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelDevice    RealWorld       Compare
//!      (reference)   (SimHardware)    Results
//! ```

use padlock_core::{DeviceProfile, FireError, Machine};
use padlock_harness::{
    ModelDevice, ObservableState, Operation, OperationResult, PinChoice, SimHardware,
};
use proptest::prelude::*;

/// Real machine wrapper that mirrors ModelDevice's interface.
struct RealWorld {
    machine: Machine<SimHardware>,
}

impl RealWorld {
    fn new(profile: DeviceProfile) -> Self {
        let machine = Machine::with_profile(profile, SimHardware::new()).unwrap();
        Self { machine }
    }

    /// Fires the operation and every follow-up it queues.
    fn apply(&mut self, op: Operation) -> OperationResult {
        let (trigger, payload) = op.to_fire();
        let mut pending = match self.machine.fire(trigger, &payload) {
            Ok(fired) => fired.queued,
            Err(error) => return classify(&error),
        };
        while !pending.is_empty() {
            let next = pending.remove(0);
            match self.machine.fire(next, &Default::default()) {
                Ok(fired) => pending.extend(fired.queued),
                Err(error) => return classify(&error),
            }
        }
        OperationResult::Fired(self.machine.state())
    }

    fn observable_state(&self) -> ObservableState {
        ObservableState::of(&self.machine)
    }
}

fn classify(error: &FireError) -> OperationResult {
    match error {
        FireError::IllegalTrigger { .. } => OperationResult::Illegal,
        FireError::GuardRejected { .. } => OperationResult::Rejected,
        FireError::ActionFailure { .. } => OperationResult::ActionFailed,
    }
}

fn pin_strategy() -> impl Strategy<Value = PinChoice> {
    prop::sample::select(PinChoice::ALL.to_vec())
}

/// Strategy for generating operations.
///
/// Weighted towards the lockout and enrollment paths, which carry most of
/// the device's rules.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        2 => Just(Operation::PowerOn),
        1 => Just(Operation::PowerOff),
        1 => Just(Operation::EnterDiagnostic),
        1 => Just(Operation::ExitDiagnostic),
        3 => Just(Operation::EnrollAdmin),
        2 => pin_strategy().prop_map(|pin| Operation::EnrollUser { pin }),
        2 => Just(Operation::EnrollRecovery),
        1 => Just(Operation::EnrollSelfDestruct),
        6 => (pin_strategy(), prop::bool::weighted(0.8))
            .prop_map(|(pin, confirmed)| Operation::EnrollPin { pin, confirmed }),
        1 => Just(Operation::ExitEnrollPin),
        2 => Just(Operation::AdminModeLogin),
        2 => Just(Operation::UnlockAdmin),
        2 => any::<u8>().prop_map(|user_id| Operation::UnlockUser { user_id }),
        1 => Just(Operation::SelfDestruct),
        3 => Just(Operation::LockAdmin),
        1 => Just(Operation::LockUser),
        6 => Just(Operation::FailUnlock),
        2 => Just(Operation::LastTryLogin),
        2 => pin_strategy().prop_map(|pin| Operation::AdminRecoveryLogin { pin }),
        2 => Just(Operation::FailAdminRecovery),
        1 => Just(Operation::UserReset),
        2 => Just(Operation::ToggleProvisionLock),
        1 => Just(Operation::EnableSelfDestruct),
        1 => Just(Operation::ArmForcedEnrollment),
        1 => Just(Operation::DeletePins),
        1 => Just(Operation::EnrollBruteForceCounter),
        1 => any::<u8>().prop_map(|value| Operation::EnrollCounter { value }),
        1 => Just(Operation::ExitEnrollCounter),
    ]
}

fn small_profile() -> DeviceProfile {
    DeviceProfile { brute_force_max: 4, recovery_attempt_limit: 3, ..DeviceProfile::default() }
}

proptest! {
    /// Verify that operation results match between model and real machine.
    ///
    /// This is the core model-based test. It generates random operation
    /// sequences and asserts that both implementations return the same
    /// results.
    #[test]
    fn prop_model_matches_real(
        ops in prop::collection::vec(operation_strategy(), 0..80)
    ) {
        let mut model = ModelDevice::new(small_profile());
        let mut real = RealWorld::new(small_profile());

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(*op);
            let real_result = real.apply(*op);

            prop_assert_eq!(
                model_result,
                real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
        }
    }

    /// Verify that observable state matches after each operation.
    #[test]
    fn prop_observable_state_matches(
        ops in prop::collection::vec(operation_strategy(), 0..80)
    ) {
        let mut model = ModelDevice::new(small_profile());
        let mut real = RealWorld::new(small_profile());

        for (i, op) in ops.iter().enumerate() {
            model.apply(*op);
            real.apply(*op);

            prop_assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "State divergence after operation {}: {:?}",
                i, op
            );
        }
    }

    /// Rejected and illegal operations leave the machine untouched.
    #[test]
    fn prop_refused_operations_change_nothing(
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut real = RealWorld::new(small_profile());

        for op in ops {
            let before = real.observable_state();
            let result = real.apply(op);
            if matches!(result, OperationResult::Illegal | OperationResult::Rejected) {
                prop_assert_eq!(before, real.observable_state());
            }
        }
    }

    /// Provision lock and self-destruct never coexist, the failure counter
    /// stays within its limit, and a bricked device only reports Bricked or
    /// Off.
    #[test]
    fn prop_device_invariants_hold(
        ops in prop::collection::vec(operation_strategy(), 0..80)
    ) {
        let mut real = RealWorld::new(small_profile());

        for op in ops {
            real.apply(op);
            let state = real.observable_state();
            prop_assert!(!(state.provision_lock && state.self_destruct_enabled));
            prop_assert!(state.failures <= state.failure_limit);
            if state.bricked {
                prop_assert!(matches!(
                    state.state,
                    padlock_core::DeviceState::Bricked | padlock_core::DeviceState::Off
                ));
            }
        }
    }
}

/// Simple deterministic test to verify basic model behavior.
#[test]
fn deterministic_enrollment_sequence() {
    let mut model = ModelDevice::new(small_profile());
    let mut real = RealWorld::new(small_profile());

    let ops = [
        Operation::PowerOn,
        Operation::EnrollAdmin,
        Operation::EnrollPin { pin: PinChoice::Alpha, confirmed: true },
        Operation::EnrollRecovery,
        Operation::EnrollPin { pin: PinChoice::Charlie, confirmed: true },
        Operation::ToggleProvisionLock,
        Operation::LockAdmin,
        Operation::FailUnlock,
        Operation::FailUnlock,
        Operation::LastTryLogin,
        Operation::FailUnlock,
        Operation::AdminRecoveryLogin { pin: PinChoice::Charlie },
        Operation::EnrollPin { pin: PinChoice::Delta, confirmed: true },
    ];

    for op in ops {
        let model_result = model.apply(op);
        let real_result = real.apply(op);
        assert_eq!(model_result, real_result, "Mismatch for {op:?}");
        assert_eq!(model.observable_state(), real.observable_state());
    }

    let state = real.observable_state();
    assert_eq!(state.state, padlock_core::DeviceState::AdminMode);
    assert_eq!(state.admin.as_deref(), Some(PinChoice::Delta.digits()));
    assert_eq!(state.recovery.iter().flatten().count(), 0);
}

/// Every documented operation has a defined outcome on a fresh device.
#[test]
fn fresh_device_agrees_on_every_operation() {
    let samples = [
        Operation::PowerOff,
        Operation::EnterDiagnostic,
        Operation::EnrollAdmin,
        Operation::UnlockAdmin,
        Operation::FailUnlock,
        Operation::UserReset,
        Operation::EnrollCounter { value: 5 },
    ];
    for op in samples {
        let mut model = ModelDevice::new(small_profile());
        let mut real = RealWorld::new(small_profile());
        assert_eq!(model.apply(Operation::PowerOn), real.apply(Operation::PowerOn));
        assert_eq!(model.apply(op), real.apply(op), "Mismatch for {op:?}");
    }
}
