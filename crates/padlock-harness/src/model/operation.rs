//! Operations for model-based testing.
//!
//! Operations are the driver-level stimuli a test can apply. They are
//! generated randomly and applied to both the model and the real machine.
//! Payloads are drawn from a small fixed set of PINs so that collisions,
//! trivial PINs and matching recovery PINs come up often.

use arbitrary::Arbitrary;
use padlock_core::{DeviceState, Payload, Pin, Trigger};

/// PINs an operation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum PinChoice {
    /// Acceptable PIN.
    Alpha,
    /// Acceptable PIN.
    Bravo,
    /// Acceptable PIN.
    Charlie,
    /// Acceptable PIN.
    Delta,
    /// Repeated digit; never accepted.
    Trivial,
    /// Below the default minimum length; never accepted.
    Short,
}

impl PinChoice {
    /// Every choice.
    pub const ALL: [Self; 6] =
        [Self::Alpha, Self::Bravo, Self::Charlie, Self::Delta, Self::Trivial, Self::Short];

    /// Digits for this choice.
    pub const fn digits(self) -> &'static str {
        match self {
            Self::Alpha => "1357924",
            Self::Bravo => "2468013",
            Self::Charlie => "9081726",
            Self::Delta => "8642097",
            Self::Trivial => "5555555",
            Self::Short => "13579",
        }
    }

    /// Whether the digits pass the length and triviality rules at the
    /// default minimum length.
    pub const fn well_formed(self) -> bool {
        !matches!(self, Self::Trivial | Self::Short)
    }

    /// As a core `Pin`.
    pub fn pin(self) -> Option<Pin> {
        Pin::new(self.digits()).ok()
    }
}

/// Driver-level stimuli.
///
/// `PowerOn` includes the self test: the driver fires whatever the machine
/// queues after power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Apply power and run the self test.
    PowerOn,
    /// Remove power.
    PowerOff,
    /// Enter diagnostics.
    EnterDiagnostic,
    /// Leave diagnostics.
    ExitDiagnostic,
    /// Start admin PIN enrollment.
    EnrollAdmin,
    /// Start user enrollment, or enroll directly under forced enrollment.
    EnrollUser {
        /// PIN entered under forced enrollment.
        pin: PinChoice,
    },
    /// Start recovery PIN enrollment.
    EnrollRecovery,
    /// Start self-destruct PIN enrollment.
    EnrollSelfDestruct,
    /// Submit the PIN being enrolled.
    EnrollPin {
        /// PIN entered.
        pin: PinChoice,
        /// Whether the confirmation matches.
        confirmed: bool,
    },
    /// Cancel PIN enrollment.
    ExitEnrollPin,
    /// Log in to admin mode.
    AdminModeLogin,
    /// Unlock with the admin PIN.
    UnlockAdmin,
    /// Unlock with a user PIN.
    UnlockUser {
        /// 1-based slot; reduced modulo 6 so invalid slots come up.
        user_id: u8,
    },
    /// Unlock with the self-destruct PIN.
    SelfDestruct,
    /// Lock from admin mode or an admin unlock.
    LockAdmin,
    /// Lock from a user unlock.
    LockUser,
    /// Enter a wrong PIN.
    FailUnlock,
    /// Use the last try.
    LastTryLogin,
    /// Log in with a recovery PIN.
    AdminRecoveryLogin {
        /// PIN entered.
        pin: PinChoice,
    },
    /// Enter a wrong recovery PIN.
    FailAdminRecovery,
    /// Reset to factory defaults from the keypad.
    UserReset,
    /// Toggle provision lock.
    ToggleProvisionLock,
    /// Enable self-destruct.
    EnableSelfDestruct,
    /// Arm forced user enrollment.
    ArmForcedEnrollment,
    /// Delete user, recovery and self-destruct PINs.
    DeletePins,
    /// Start brute-force counter enrollment.
    EnrollBruteForceCounter,
    /// Submit a counter value.
    EnrollCounter {
        /// Value; reduced modulo 12 so both valid and invalid values come up.
        value: u8,
    },
    /// Cancel counter enrollment.
    ExitEnrollCounter,
}

impl Operation {
    /// Trigger and payload the driver fires for this operation.
    pub fn to_fire(self) -> (Trigger, Payload) {
        match self {
            Self::PowerOn => (Trigger::PowerOn, Payload::none()),
            Self::PowerOff => (Trigger::PowerOff, Payload::none()),
            Self::EnterDiagnostic => (Trigger::EnterDiagnosticMode, Payload::none()),
            Self::ExitDiagnostic => (Trigger::ExitDiagnosticMode, Payload::none()),
            Self::EnrollAdmin => (Trigger::EnrollAdmin, Payload::none()),
            Self::EnrollUser { pin } => {
                (Trigger::EnrollUser, Payload { new_pin: pin.pin(), ..Payload::none() })
            },
            Self::EnrollRecovery => (Trigger::EnrollRecovery, Payload::none()),
            Self::EnrollSelfDestruct => (Trigger::EnrollSelfDestruct, Payload::none()),
            Self::EnrollPin { pin, confirmed } => {
                let confirm = if confirmed { pin } else { mismatch(pin) };
                let payload =
                    Payload { new_pin: pin.pin(), confirm_pin: confirm.pin(), ..Payload::none() };
                (Trigger::EnrollPin, payload)
            },
            Self::ExitEnrollPin => (Trigger::ExitEnrollPin, Payload::none()),
            Self::AdminModeLogin => (Trigger::AdminModeLogin, Payload::none()),
            Self::UnlockAdmin => (Trigger::UnlockAdmin, Payload::none()),
            Self::UnlockUser { user_id } => (Trigger::UnlockUser, Payload::user(user_id % 6)),
            Self::SelfDestruct => (Trigger::SelfDestruct, Payload::none()),
            Self::LockAdmin => (Trigger::LockAdmin, Payload::none()),
            Self::LockUser => (Trigger::LockUser, Payload::none()),
            Self::FailUnlock => (Trigger::FailUnlock, Payload::none()),
            Self::LastTryLogin => (Trigger::LastTryLogin, Payload::none()),
            Self::AdminRecoveryLogin { pin } => {
                (Trigger::AdminRecoveryLogin, Payload { pin: pin.pin(), ..Payload::none() })
            },
            Self::FailAdminRecovery => (Trigger::FailAdminRecovery, Payload::none()),
            Self::UserReset => (Trigger::UserReset, Payload::none()),
            Self::ToggleProvisionLock => (Trigger::ToggleProvisionLock, Payload::none()),
            Self::EnableSelfDestruct => (Trigger::EnableSelfDestruct, Payload::none()),
            Self::ArmForcedEnrollment => (Trigger::ToggleUserForcedEnrollment, Payload::none()),
            Self::DeletePins => (Trigger::DeletePins, Payload::none()),
            Self::EnrollBruteForceCounter => (Trigger::EnrollBruteForceCounter, Payload::none()),
            Self::EnrollCounter { value } => (Trigger::EnrollCounter, Payload::counter(value % 12)),
            Self::ExitEnrollCounter => (Trigger::ExitEnrollCounter, Payload::none()),
        }
    }
}

/// A different PIN to use as a mismatched confirmation.
const fn mismatch(pin: PinChoice) -> PinChoice {
    match pin {
        PinChoice::Alpha => PinChoice::Bravo,
        _ => PinChoice::Alpha,
    }
}

/// Outcome of applying an operation, compared between model and machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// The trigger fired; the machine ended in this state.
    Fired(DeviceState),
    /// The trigger is not valid in the current state.
    Illegal,
    /// Every candidate's guard refused.
    Rejected,
    /// An action failed.
    ActionFailed,
}

impl OperationResult {
    /// Check if the operation changed state.
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }
}
