//! Behavior under unreliable hardware.
//!
//! Missed confirmations and rig faults must never leave the DUT model in a
//! state the device itself could not be in.

use padlock_core::{
    ActionPhase, DeviceProfile, DeviceState, FireError, HardwareError, LedPattern, Machine,
    Payload, Pin, Trigger,
};
use padlock_harness::{HardwareCall, ObservableState, Operation, SimHardware};
use proptest::prelude::*;

fn boot(machine: &mut Machine<SimHardware>) {
    let fired = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap();
    for trigger in fired.queued {
        machine.fire(trigger, &Payload::none()).unwrap();
    }
}

fn enrolled_machine() -> Machine<SimHardware> {
    let mut machine = Machine::new(SimHardware::new());
    boot(&mut machine);
    machine.fire(Trigger::EnrollAdmin, &Payload::none()).unwrap();
    let pin = Pin::new("1357924").unwrap();
    machine.fire(Trigger::EnrollPin, &Payload::new_pin(pin)).unwrap();
    machine.fire(Trigger::LockAdmin, &Payload::none()).unwrap();
    machine
}

#[test]
fn rig_fault_before_commit_rolls_back() {
    let mut machine = enrolled_machine();
    let before = ObservableState::of(&machine);

    machine.hardware_mut().fail_next_call(HardwareError::Actuator {
        channel: "keypad".into(),
        reason: "stuck".into(),
    });
    let error = machine.fire(Trigger::FailUnlock, &Payload::none()).unwrap_err();

    assert!(matches!(
        error,
        FireError::ActionFailure { phase: ActionPhase::Before, committed: false, .. }
    ));
    assert_eq!(ObservableState::of(&machine), before);
}

#[test]
fn missed_arrival_keeps_the_committed_state() {
    let mut machine = enrolled_machine();
    machine.hardware_mut().refuse_once(LedPattern::AdminMode);

    let error = machine.fire(Trigger::AdminModeLogin, &Payload::none()).unwrap_err();

    assert!(matches!(
        error,
        FireError::ActionFailure { phase: ActionPhase::After, committed: true, .. }
    ));
    assert_eq!(machine.state(), DeviceState::AdminMode);
    assert_eq!(machine.history().last().map(|f| f.state), Some(DeviceState::AdminMode));
}

#[test]
fn refused_self_test_lands_in_error() {
    let mut machine = Machine::new(SimHardware::new());
    machine.hardware_mut().refuse(LedPattern::AcceptPattern);

    let fired = machine.fire(Trigger::PowerOn, &Payload::none()).unwrap();
    assert_eq!(fired.queued, vec![Trigger::PostFail]);
    machine.fire(Trigger::PostFail, &Payload::none()).unwrap();

    assert_eq!(machine.state(), DeviceState::Error);
    assert!(machine.hardware().calls().contains(&HardwareCall::Power(
        padlock_core::PowerState::On { usb3: true }
    )));
}

proptest! {
    /// Randomly dropped confirmations never break the device invariants.
    #[test]
    fn prop_faults_preserve_invariants(
        seed in any::<u64>(),
        ops in prop::collection::vec(any_operation(), 0..60),
    ) {
        let profile = DeviceProfile { brute_force_max: 4, ..DeviceProfile::default() };
        let hardware = SimHardware::with_fault_rate(seed, 0.1);
        let mut machine = Machine::with_profile(profile, hardware).unwrap();

        for op in ops {
            let (trigger, payload) = op.to_fire();
            let before = ObservableState::of(&machine);
            let mut pending = match machine.fire(trigger, &payload) {
                Ok(fired) => fired.queued,
                Err(FireError::ActionFailure { committed: false, .. }) => {
                    prop_assert_eq!(&before, &ObservableState::of(&machine));
                    Vec::new()
                },
                Err(_) => Vec::new(),
            };
            while let Some(next) = pending.pop() {
                if let Ok(fired) = machine.fire(next, &Payload::none()) {
                    pending.extend(fired.queued);
                }
            }

            let dut = machine.dut();
            prop_assert!(!(dut.flags().provision_lock && dut.flags().self_destruct_enabled));
            prop_assert!(dut.counters().brute_force_current <= dut.counters().brute_force_max);
            if dut.is_bricked() {
                prop_assert!(matches!(machine.state(), DeviceState::Bricked | DeviceState::Off));
            }
        }
    }
}

fn any_operation() -> impl Strategy<Value = Operation> {
    any::<[u8; 8]>().prop_filter_map("unstructured input ran dry", |bytes| {
        let mut input = arbitrary::Unstructured::new(&bytes);
        input.arbitrary().ok()
    })
}
