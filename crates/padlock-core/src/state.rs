//! Device security states.
//!
//! The state names are the ones the rig logs and the scenario files use, so
//! `Display` and `FromStr` are stable and round-trip through serde.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Security state of the device under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// Unpowered.
    Off,
    /// Power-on self test in progress.
    Post,
    /// Out-of-box: no admin PIN enrolled.
    Oob,
    /// Locked, waiting for a credential.
    Standby,
    /// Locked, and the admin requires a user PIN to be enrolled.
    UserForcedEnrollment,
    /// Unlocked with the admin PIN (or the self-destruct PIN).
    UnlockedAdmin,
    /// Unlocked with a user PIN.
    UnlockedUser,
    /// Admin configuration mode.
    AdminMode,
    /// Multi-step PIN enrollment prompt.
    PinEnrollment,
    /// Numeric counter enrollment prompt.
    CounterEnrollment,
    /// Diagnostic mode.
    Diagnostic,
    /// Brute-force lockout.
    BruteForce,
    /// Permanently bricked.
    Bricked,
    /// Error state (failed POST or critical error).
    Error,
}

impl DeviceState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Off,
        Self::Post,
        Self::Oob,
        Self::Standby,
        Self::UserForcedEnrollment,
        Self::UnlockedAdmin,
        Self::UnlockedUser,
        Self::AdminMode,
        Self::PinEnrollment,
        Self::CounterEnrollment,
        Self::Diagnostic,
        Self::BruteForce,
        Self::Bricked,
        Self::Error,
    ];

    /// Canonical name, as logged by the rig.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Post => "POST",
            Self::Oob => "OOB",
            Self::Standby => "STANDBY",
            Self::UserForcedEnrollment => "USER_FORCED_ENROLLMENT",
            Self::UnlockedAdmin => "UNLOCKED_ADMIN",
            Self::UnlockedUser => "UNLOCKED_USER",
            Self::AdminMode => "ADMIN_MODE",
            Self::PinEnrollment => "PIN_ENROLLMENT",
            Self::CounterEnrollment => "COUNTER_ENROLLMENT",
            Self::Diagnostic => "DIAGNOSTIC",
            Self::BruteForce => "BRUTE_FORCE",
            Self::Bricked => "BRICKED",
            Self::Error => "ERROR",
        }
    }

    /// States in which the admin PIN slot is unset exactly when the device
    /// is out-of-box.
    ///
    /// Transitional states (power, prompts, diagnostics, terminal states)
    /// carry whatever the previous resting state had.
    pub const fn is_resting(self) -> bool {
        matches!(
            self,
            Self::Oob
                | Self::Standby
                | Self::UserForcedEnrollment
                | Self::AdminMode
                | Self::UnlockedAdmin
                | Self::UnlockedUser
                | Self::BruteForce
        )
    }

    /// Terminal outcomes a driver should stop on.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Bricked | Self::Error)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device state: {name}")]
pub struct ParseStateError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for DeviceState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStateError { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for state in DeviceState::ALL {
            assert_eq!(state.as_str().parse::<DeviceState>(), Ok(state));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("brute_force".parse::<DeviceState>(), Ok(DeviceState::BruteForce));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let err = "FACTORY_MODE".parse::<DeviceState>().unwrap_err();
        assert_eq!(err.to_string(), "unknown device state: FACTORY_MODE");
    }

    #[test]
    fn serde_uses_canonical_names() {
        let mut buf = Vec::new();
        ciborium::into_writer(&DeviceState::UserForcedEnrollment, &mut buf).unwrap();
        let text: String = ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(text, "USER_FORCED_ENROLLMENT");
    }
}
