//! Reference device model.
//!
//! `ModelDevice` restates the device rules as a flat `match` over
//! (state, operation), with no transition table, guards or actions. It is
//! the oracle the real machine is compared against.

use padlock_core::{DeviceProfile, DeviceState, Hardware, Machine};

use super::operation::{Operation, OperationResult, PinChoice};

type S = DeviceState;

/// Slot kind being enrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Admin,
    User,
    Recovery,
    SelfDestruct,
}

/// Observable state for oracle comparison.
///
/// This is the subset of device state that both the model and the machine
/// expose. PINs are compared by their digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Machine state.
    pub state: DeviceState,
    /// Admin PIN.
    pub admin: Option<String>,
    /// User slots.
    pub users: Vec<Option<String>>,
    /// Recovery slots.
    pub recovery: Vec<Option<String>>,
    /// Self-destruct PIN.
    pub self_destruct_pin: Option<String>,
    /// Provision lock flag.
    pub provision_lock: bool,
    /// Self-destruct flag.
    pub self_destruct_enabled: bool,
    /// Forced enrollment flag.
    pub forced_enrollment: bool,
    /// Failed unlocks in this episode.
    pub failures: u8,
    /// Brute-force limit.
    pub failure_limit: u8,
    /// Last try spent in this episode.
    pub last_try_used: bool,
    /// Failed recovery logins.
    pub recovery_attempts: u8,
    /// Bricked marker.
    pub bricked: bool,
}

impl ObservableState {
    /// Extracts the observable state of a real machine.
    pub fn of<H: Hardware>(machine: &Machine<H>) -> Self {
        let dut = machine.dut();
        let digits = |pins: &[Option<padlock_core::Pin>]| -> Vec<Option<String>> {
            pins.iter().map(|pin| pin.as_ref().map(|p| p.as_str().to_string())).collect()
        };
        Self {
            state: machine.state(),
            admin: dut.admin_pin().map(|p| p.as_str().to_string()),
            users: digits(dut.user_pins()),
            recovery: digits(dut.recovery_pins()),
            self_destruct_pin: dut.self_destruct_pin().map(|p| p.as_str().to_string()),
            provision_lock: dut.flags().provision_lock,
            self_destruct_enabled: dut.flags().self_destruct_enabled,
            forced_enrollment: dut.flags().user_forced_enrollment,
            failures: dut.counters().brute_force_current,
            failure_limit: dut.counters().brute_force_max,
            last_try_used: dut.last_try_used(),
            recovery_attempts: dut.counters().admin_recovery_attempts,
            bricked: dut.is_bricked(),
        }
    }
}

/// Model device - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelDevice {
    profile: DeviceProfile,
    state: DeviceState,
    admin: Option<PinChoice>,
    users: Vec<Option<PinChoice>>,
    recovery: Vec<Option<PinChoice>>,
    self_destruct_pin: Option<PinChoice>,
    provision_lock: bool,
    self_destruct_enabled: bool,
    forced_enrollment: bool,
    failures: u8,
    failure_limit: u8,
    last_try_used: bool,
    recovery_attempts: u8,
    bricked: bool,
    enrolling: Option<Slot>,
    counter_pending: bool,
}

impl ModelDevice {
    /// Factory-fresh, powered-off device for `profile`.
    ///
    /// The model assumes the profile's default minimum PIN length.
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            state: S::Off,
            admin: None,
            users: vec![None; usize::from(profile.user_slots)],
            recovery: vec![None; usize::from(profile.recovery_slots)],
            self_destruct_pin: None,
            provision_lock: false,
            self_destruct_enabled: false,
            forced_enrollment: false,
            failures: 0,
            failure_limit: profile.brute_force_max,
            last_try_used: false,
            recovery_attempts: 0,
            bricked: false,
            enrolling: None,
            counter_pending: false,
            profile,
        }
    }

    /// Current state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let digits = |pins: &[Option<PinChoice>]| -> Vec<Option<String>> {
            pins.iter().map(|pin| pin.map(|p| p.digits().to_string())).collect()
        };
        ObservableState {
            state: self.state,
            admin: self.admin.map(|p| p.digits().to_string()),
            users: digits(&self.users),
            recovery: digits(&self.recovery),
            self_destruct_pin: self.self_destruct_pin.map(|p| p.digits().to_string()),
            provision_lock: self.provision_lock,
            self_destruct_enabled: self.self_destruct_enabled,
            forced_enrollment: self.forced_enrollment,
            failures: self.failures,
            failure_limit: self.failure_limit,
            last_try_used: self.last_try_used,
            recovery_attempts: self.recovery_attempts,
            bricked: self.bricked,
        }
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match what the real machine reports.
    pub fn apply(&mut self, op: Operation) -> OperationResult {
        let locked = matches!(self.state, S::Standby | S::UserForcedEnrollment);
        let admin_mode = self.state == S::AdminMode;

        match op {
            Operation::PowerOn if self.state == S::Off => {
                if self.bricked {
                    self.go(S::Bricked)
                } else {
                    let landing = self.boot_state();
                    self.go(landing)
                }
            },
            Operation::PowerOff if self.state != S::Off => self.go(S::Off),

            Operation::EnterDiagnostic
                if matches!(self.state, S::Oob | S::Standby | S::UserForcedEnrollment) =>
            {
                self.go(S::Diagnostic)
            },
            Operation::ExitDiagnostic if self.state == S::Diagnostic => {
                let landing = if self.forced_enrollment {
                    S::UserForcedEnrollment
                } else if self.admin.is_none() {
                    S::Oob
                } else {
                    S::Standby
                };
                self.go(landing)
            },

            Operation::EnrollAdmin if self.state == S::Oob => self.begin(Slot::Admin),
            Operation::EnrollUser { pin } if self.state == S::UserForcedEnrollment => {
                if !self.users.contains(&None) {
                    return OperationResult::Rejected;
                }
                if self.acceptable(pin, Slot::User) {
                    self.store(pin, Slot::User);
                    self.go(S::Standby)
                } else {
                    self.go(S::UserForcedEnrollment)
                }
            },
            Operation::EnrollUser { .. } if admin_mode => {
                if self.users.contains(&None) { self.begin(Slot::User) } else { OperationResult::Rejected }
            },
            Operation::EnrollRecovery if admin_mode => {
                if self.recovery.contains(&None) {
                    self.begin(Slot::Recovery)
                } else {
                    OperationResult::Rejected
                }
            },
            Operation::EnrollSelfDestruct if admin_mode => {
                if self.self_destruct_enabled {
                    self.begin(Slot::SelfDestruct)
                } else {
                    OperationResult::Rejected
                }
            },
            Operation::EnrollPin { pin, confirmed } if self.state == S::PinEnrollment => {
                let slot = self.enrolling.take();
                let accepted = slot.filter(|&slot| confirmed && self.acceptable(pin, slot));
                if let Some(slot) = accepted {
                    self.store(pin, slot);
                    self.go(S::AdminMode)
                } else if self.admin.is_none() {
                    self.go(S::Oob)
                } else {
                    self.go(S::AdminMode)
                }
            },
            Operation::ExitEnrollPin if self.state == S::PinEnrollment => {
                self.enrolling = None;
                let landing = if self.admin.is_none() { S::Oob } else { S::AdminMode };
                self.go(landing)
            },

            Operation::AdminModeLogin if locked => {
                self.end_episode();
                self.go(S::AdminMode)
            },
            Operation::UnlockAdmin if locked => {
                self.end_episode();
                self.go(S::UnlockedAdmin)
            },
            Operation::UnlockUser { user_id } if locked => {
                let slot = usize::from(user_id % 6).checked_sub(1);
                if slot.and_then(|i| self.users.get(i).copied().flatten()).is_none() {
                    return OperationResult::Rejected;
                }
                self.end_episode();
                self.go(S::UnlockedUser)
            },
            Operation::SelfDestruct if locked => {
                if !self.self_destruct_enabled || self.self_destruct_pin.is_none() {
                    return OperationResult::Rejected;
                }
                self.admin = self.self_destruct_pin.take();
                self.users.fill(None);
                self.recovery.fill(None);
                self.self_destruct_enabled = false;
                self.forced_enrollment = false;
                self.end_episode();
                self.go(S::UnlockedAdmin)
            },
            Operation::LockAdmin if matches!(self.state, S::AdminMode | S::UnlockedAdmin) => {
                self.lock()
            },
            Operation::LockUser if self.state == S::UnlockedUser => self.lock(),

            Operation::FailUnlock if locked => self.fail_unlock(),
            Operation::LastTryLogin if self.state == S::BruteForce => {
                if !self.last_try_available() {
                    return OperationResult::Rejected;
                }
                self.last_try_used = true;
                let landing =
                    if self.forced_enrollment { S::UserForcedEnrollment } else { S::Standby };
                self.go(landing)
            },
            Operation::AdminRecoveryLogin { pin } if self.state == S::BruteForce => {
                let slot = self.recovery.iter().position(|p| *p == Some(pin));
                match slot {
                    Some(index) if self.awaiting_recovery() => {
                        self.recovery[index] = None;
                        self.end_episode();
                        self.enrolling = Some(Slot::Admin);
                        self.go(S::PinEnrollment)
                    },
                    _ => OperationResult::Rejected,
                }
            },
            Operation::FailAdminRecovery if self.state == S::BruteForce => {
                if !self.awaiting_recovery() {
                    return OperationResult::Rejected;
                }
                self.recovery_attempts = self.recovery_attempts.saturating_add(1);
                if self.recovery_attempts >= self.profile.recovery_attempt_limit {
                    self.bricked = true;
                    self.go(S::Bricked)
                } else {
                    self.go(S::BruteForce)
                }
            },

            Operation::UserReset if admin_mode => {
                self.factory_reset();
                self.go(S::Oob)
            },
            Operation::UserReset
                if matches!(self.state, S::Oob | S::Standby | S::UserForcedEnrollment | S::BruteForce) =>
            {
                if self.provision_lock {
                    return OperationResult::Rejected;
                }
                self.factory_reset();
                self.go(S::Oob)
            },

            Operation::ToggleProvisionLock if admin_mode => {
                if self.self_destruct_enabled {
                    return OperationResult::Rejected;
                }
                self.provision_lock = !self.provision_lock;
                self.go(S::AdminMode)
            },
            Operation::EnableSelfDestruct if admin_mode => {
                if self.provision_lock {
                    return OperationResult::Rejected;
                }
                self.self_destruct_enabled = true;
                self.go(S::AdminMode)
            },
            Operation::ArmForcedEnrollment if admin_mode => {
                if self.forced_enrollment || !self.users.contains(&None) {
                    return OperationResult::Rejected;
                }
                self.forced_enrollment = true;
                self.go(S::AdminMode)
            },
            Operation::DeletePins if admin_mode => {
                if self.forced_enrollment {
                    return OperationResult::Rejected;
                }
                self.users.fill(None);
                self.recovery.fill(None);
                self.self_destruct_pin = None;
                self.go(S::AdminMode)
            },

            Operation::EnrollBruteForceCounter if admin_mode => {
                self.counter_pending = true;
                self.go(S::CounterEnrollment)
            },
            Operation::EnrollCounter { value } if self.state == S::CounterEnrollment => {
                let value = value % 12;
                if std::mem::take(&mut self.counter_pending) && (2..=10).contains(&value) {
                    self.failure_limit = value;
                    self.end_episode();
                }
                self.go(S::AdminMode)
            },
            Operation::ExitEnrollCounter if self.state == S::CounterEnrollment => {
                self.counter_pending = false;
                self.go(S::AdminMode)
            },

            _ => OperationResult::Illegal,
        }
    }

    fn go(&mut self, state: DeviceState) -> OperationResult {
        self.state = state;
        OperationResult::Fired(state)
    }

    fn begin(&mut self, slot: Slot) -> OperationResult {
        self.enrolling = Some(slot);
        self.go(S::PinEnrollment)
    }

    fn lock(&mut self) -> OperationResult {
        let landing = if self.forced_enrollment { S::UserForcedEnrollment } else { S::Standby };
        self.go(landing)
    }

    fn midpoint(&self) -> u8 {
        self.failure_limit / 2
    }

    fn exhausted(&self) -> bool {
        self.failures >= self.failure_limit
    }

    fn last_try_available(&self) -> bool {
        self.failures == self.midpoint() && !self.last_try_used && !self.exhausted()
    }

    fn awaiting_recovery(&self) -> bool {
        self.provision_lock && self.exhausted()
    }

    fn boot_state(&self) -> DeviceState {
        if self.exhausted() || self.last_try_available() {
            S::BruteForce
        } else if self.forced_enrollment {
            S::UserForcedEnrollment
        } else if self.admin.is_none() {
            S::Oob
        } else {
            S::Standby
        }
    }

    fn fail_unlock(&mut self) -> OperationResult {
        if self.last_try_used {
            if self.provision_lock {
                self.failures = self.failure_limit;
                return self.go(S::BruteForce);
            }
            self.factory_reset();
            return self.go(S::Oob);
        }
        self.failures = self.failures.saturating_add(1).min(self.failure_limit);
        if self.failures >= self.midpoint() { self.go(S::BruteForce) } else { self.go(self.state) }
    }

    fn end_episode(&mut self) {
        self.failures = 0;
        self.recovery_attempts = 0;
        self.last_try_used = false;
    }

    fn factory_reset(&mut self) {
        let bricked = self.bricked;
        *self = Self::new(self.profile.clone());
        self.bricked = bricked;
    }

    /// Whether the device takes `pin` for `slot`: well-formed, the slot kind
    /// has room, and no other slot holds the same digits.
    fn acceptable(&self, pin: PinChoice, slot: Slot) -> bool {
        let room = match slot {
            Slot::Admin => true,
            Slot::User => self.users.contains(&None),
            Slot::Recovery => self.recovery.contains(&None),
            Slot::SelfDestruct => self.self_destruct_enabled,
        };
        let replaced = match slot {
            Slot::Admin => self.admin,
            Slot::SelfDestruct => self.self_destruct_pin,
            Slot::User | Slot::Recovery => None,
        };
        let taken = self
            .admin
            .iter()
            .chain(self.users.iter().flatten())
            .chain(self.recovery.iter().flatten())
            .chain(self.self_destruct_pin.iter())
            .any(|&enrolled| enrolled == pin && Some(enrolled) != replaced);
        room && pin.well_formed() && !taken
    }

    fn store(&mut self, pin: PinChoice, slot: Slot) {
        match slot {
            Slot::Admin => self.admin = Some(pin),
            Slot::User => {
                if let Some(free) = self.users.iter_mut().find(|p| p.is_none()) {
                    *free = Some(pin);
                }
                self.forced_enrollment = false;
            },
            Slot::Recovery => {
                if let Some(free) = self.recovery.iter_mut().find(|p| p.is_none()) {
                    *free = Some(pin);
                }
            },
            Slot::SelfDestruct => self.self_destruct_pin = Some(pin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ModelDevice {
        ModelDevice::new(DeviceProfile { brute_force_max: 4, ..DeviceProfile::default() })
    }

    #[test]
    fn fresh_device_boots_out_of_box() {
        let mut model = small();
        assert_eq!(model.apply(Operation::PowerOn), OperationResult::Fired(S::Oob));
        assert_eq!(model.apply(Operation::PowerOn), OperationResult::Illegal);
    }

    #[test]
    fn duplicate_pin_is_refused() {
        let mut model = small();
        model.apply(Operation::PowerOn);
        model.apply(Operation::EnrollAdmin);
        model.apply(Operation::EnrollPin { pin: PinChoice::Alpha, confirmed: true });
        model.apply(Operation::EnrollUser { pin: PinChoice::Alpha });
        model.apply(Operation::EnrollPin { pin: PinChoice::Alpha, confirmed: true });
        assert_eq!(model.observable_state().users[0], None);
    }

    #[test]
    fn last_try_then_failure_resets() {
        let mut model = small();
        model.apply(Operation::PowerOn);
        model.apply(Operation::EnrollAdmin);
        model.apply(Operation::EnrollPin { pin: PinChoice::Bravo, confirmed: true });
        model.apply(Operation::LockAdmin);
        model.apply(Operation::FailUnlock);
        assert_eq!(model.apply(Operation::FailUnlock), OperationResult::Fired(S::BruteForce));
        assert_eq!(model.apply(Operation::LastTryLogin), OperationResult::Fired(S::Standby));
        assert_eq!(model.apply(Operation::FailUnlock), OperationResult::Fired(S::Oob));
        assert_eq!(model.observable_state().admin, None);
    }
}
