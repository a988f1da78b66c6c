//! Trigger vocabulary.
//!
//! Triggers are the only inputs the engine accepts. Drivers name them in
//! `snake_case` (scenario files, CLI), which is what `as_str` returns.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! triggers {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        /// An event fired into the state machine.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Trigger {
            $($(#[$doc])* $variant,)+
        }

        impl Trigger {
            /// Every trigger, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Canonical `snake_case` name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

triggers! {
    /// Apply power.
    PowerOn => "power_on",
    /// Remove power.
    PowerOff => "power_off",
    /// Self test succeeded.
    PostPass => "post_pass",
    /// Self test failed.
    PostFail => "post_fail",
    /// Unrecoverable fault observed.
    CriticalError => "critical_error",
    /// Enter diagnostic mode.
    EnterDiagnosticMode => "enter_diagnostic_mode",
    /// Leave diagnostic mode.
    ExitDiagnosticMode => "exit_diagnostic_mode",
    /// Start admin PIN enrollment.
    EnrollAdmin => "enroll_admin",
    /// Start user PIN enrollment (or complete a forced enrollment).
    EnrollUser => "enroll_user",
    /// Start recovery PIN enrollment.
    EnrollRecovery => "enroll_recovery",
    /// Start self-destruct PIN enrollment.
    EnrollSelfDestruct => "enroll_self_destruct",
    /// Enter and confirm the pending PIN.
    EnrollPin => "enroll_pin",
    /// PIN enrollment prompt timed out.
    TimeoutEnrollPin => "timeout_enroll_pin",
    /// PIN enrollment cancelled.
    ExitEnrollPin => "exit_enroll_pin",
    /// Start brute-force limit enrollment.
    EnrollBruteForceCounter => "enroll_brute_force_counter",
    /// Start minimum PIN length enrollment.
    EnrollMinPinCounter => "enroll_min_pin_counter",
    /// Start unattended auto-lock enrollment.
    EnrollUnattendedAutoLockCounter => "enroll_unattended_auto_lock_counter",
    /// Enter the pending counter value.
    EnrollCounter => "enroll_counter",
    /// Counter enrollment prompt timed out.
    TimeoutEnrollCounter => "timeout_enroll_counter",
    /// Counter enrollment cancelled.
    ExitEnrollCounter => "exit_enroll_counter",
    /// Factory reset by the user.
    UserReset => "user_reset",
    /// Log into admin mode.
    AdminModeLogin => "admin_mode_login",
    /// Unlock with the admin PIN.
    UnlockAdmin => "unlock_admin",
    /// Unlock with a user PIN.
    UnlockUser => "unlock_user",
    /// Lock from an admin session.
    LockAdmin => "lock_admin",
    /// Lock from a user session.
    LockUser => "lock_user",
    /// Unlock with the self-destruct PIN.
    SelfDestruct => "self_destruct",
    /// Enter a wrong PIN.
    FailUnlock => "fail_unlock",
    /// Use the single last-try attempt at the brute-force midpoint.
    LastTryLogin => "last_try_login",
    /// Log in with a recovery PIN after provision-locked exhaustion.
    AdminRecoveryLogin => "admin_recovery_login",
    /// Enter a wrong recovery PIN.
    FailAdminRecovery => "fail_admin_recovery",
    /// Toggle basic disk mode.
    ToggleBasicDisk => "toggle_basic_disk",
    /// Toggle removable media mode.
    ToggleRemovableMedia => "toggle_removable_media",
    /// Enable LED flicker.
    EnableLedFlicker => "enable_led_flicker",
    /// Disable LED flicker.
    DisableLedFlicker => "disable_led_flicker",
    /// Toggle lock override.
    ToggleLockOverride => "toggle_lock_override",
    /// Toggle provision lock.
    ToggleProvisionLock => "toggle_provision_lock",
    /// Switch to read-only.
    ToggleReadOnly => "toggle_read_only",
    /// Switch to read-write.
    ToggleReadWrite => "toggle_read_write",
    /// Enable self-destruct.
    EnableSelfDestruct => "enable_self_destruct",
    /// Arm user-forced enrollment.
    ToggleUserForcedEnrollment => "toggle_user_forced_enrollment",
    /// Delete user, recovery and self-destruct PINs.
    DeletePins => "delete_pins",
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown trigger name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trigger: {name}")]
pub struct ParseTriggerError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for Trigger {
    type Err = ParseTriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|trigger| trigger.as_str() == s)
            .ok_or_else(|| ParseTriggerError { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique_and_round_trip() {
        let mut seen = HashSet::new();
        for &trigger in Trigger::ALL {
            assert!(seen.insert(trigger.as_str()), "duplicate name {trigger}");
            assert_eq!(trigger.as_str().parse::<Trigger>(), Ok(trigger));
        }
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let err = "manufacturer_reset".parse::<Trigger>().unwrap_err();
        assert_eq!(err.name, "manufacturer_reset");
    }
}
