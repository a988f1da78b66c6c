//! Hardware capability boundary.
//!
//! The `Hardware` trait is everything the state machine needs from the rig:
//! key injection, LED pattern confirmation, USB enumeration checks and power
//! control. Camera capture, LED classification and relay control live behind
//! it and are not modeled here.
//!
//! # Invariants
//!
//! - Blocking: every call returns before the next one is made. The engine
//!   never has two calls in flight.
//! - Bounded: every confirmation takes an explicit timeout and must return
//!   once it elapses. A confirmation that did not observe the expected
//!   outcome returns `Ok(false)`, not an error.
//! - No retries: the engine surfaces a `false` confirmation to the driver as
//!   an action failure. Retrying is the driver's decision.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A keypad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Digit 0.
    Key0,
    /// Digit 1.
    Key1,
    /// Digit 2.
    Key2,
    /// Digit 3.
    Key3,
    /// Digit 4.
    Key4,
    /// Digit 5.
    Key5,
    /// Digit 6.
    Key6,
    /// Digit 7.
    Key7,
    /// Digit 8.
    Key8,
    /// Digit 9.
    Key9,
    /// Lock button.
    Lock,
    /// Unlock button.
    Unlock,
}

impl Key {
    /// Key for an ASCII digit, if `c` is one.
    pub const fn digit(c: char) -> Option<Self> {
        Some(match c {
            '0' => Self::Key0,
            '1' => Self::Key1,
            '2' => Self::Key2,
            '3' => Self::Key3,
            '4' => Self::Key4,
            '5' => Self::Key5,
            '6' => Self::Key6,
            '7' => Self::Key7,
            '8' => Self::Key8,
            '9' => Self::Key9,
            _ => return None,
        })
    }

    /// Channel name used by the actuation relays.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key0 => "key0",
            Self::Key1 => "key1",
            Self::Key2 => "key2",
            Self::Key3 => "key3",
            Self::Key4 => "key4",
            Self::Key5 => "key5",
            Self::Key6 => "key6",
            Self::Key7 => "key7",
            Self::Key8 => "key8",
            Self::Key9 => "key9",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LED patterns the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedPattern {
    /// Single green acknowledgement.
    AcceptState,
    /// Green blink sequence acknowledging an entry.
    AcceptPattern,
    /// Red blink sequence rejecting an entry.
    Reject,
    /// Solid blue: admin mode.
    AdminMode,
    /// All LEDs dark.
    AllOff,
    /// Standby breathing pattern.
    StandbyMode,
    /// Solid green and blue: out-of-box.
    GreenBlueState,
    /// Blinking green and blue: PIN prompt.
    GreenBlue,
    /// Key generation after a reset.
    KeyGeneration,
    /// Brute-force lockout indication.
    BruteForced,
    /// Red counter blink while counting failures.
    RedCounter,
    /// Red blink: admin login prompt.
    RedLogin,
    /// Red and blue: self-destruct PIN prompt.
    RedBlue,
    /// Red and green: last-try prompt.
    RedGreen,
    /// Red, green and blue: startup self test.
    RedGreenBlue,
    /// Green blink while enumerating.
    Enum,
    /// Enumeration with read-only set.
    EnumReadOnly,
    /// Enumeration with lock override set.
    EnumLockOverride,
    /// Enumeration with lock override and read-only set.
    EnumLockOverrideReadOnly,
    /// Error indication.
    ErrorState,
    /// Diagnostic mode indication.
    DiagnosticMode,
}

impl LedPattern {
    /// Classifier name, as it appears in scenario files and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AcceptState => "ACCEPT_STATE",
            Self::AcceptPattern => "ACCEPT_PATTERN",
            Self::Reject => "REJECT",
            Self::AdminMode => "ADMIN_MODE",
            Self::AllOff => "ALL_OFF",
            Self::StandbyMode => "STANDBY_MODE",
            Self::GreenBlueState => "GREEN_BLUE_STATE",
            Self::GreenBlue => "GREEN_BLUE",
            Self::KeyGeneration => "KEY_GENERATION",
            Self::BruteForced => "BRUTE_FORCED",
            Self::RedCounter => "RED_COUNTER",
            Self::RedLogin => "RED_LOGIN",
            Self::RedBlue => "RED_BLUE",
            Self::RedGreen => "RED_GREEN",
            Self::RedGreenBlue => "RED_GREEN_BLUE",
            Self::Enum => "ENUM",
            Self::EnumReadOnly => "ENUM_READ_ONLY",
            Self::EnumLockOverride => "ENUM_LOCK_OVERRIDE",
            Self::EnumLockOverrideReadOnly => "ENUM_LOCK_OVERRIDE_READ_ONLY",
            Self::ErrorState => "ERROR_STATE",
            Self::DiagnosticMode => "DIAGNOSTIC_MODE",
        }
    }
}

impl fmt::Display for LedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Power relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    /// Supply and data disconnected.
    Off,
    /// Supply connected.
    On {
        /// Whether the USB 3 data lines are connected too.
        usb3: bool,
    },
}

/// Failure of the rig itself (not of the device).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    /// An actuation relay did not respond.
    #[error("actuator fault on {channel}: {reason}")]
    Actuator {
        /// Relay channel.
        channel: String,
        /// Description of the fault.
        reason: String,
    },

    /// The camera or classifier is unavailable.
    #[error("indicator capture unavailable: {reason}")]
    Capture {
        /// Description of the fault.
        reason: String,
    },

    /// The USB inspection backend failed.
    #[error("enumeration probe failed: {reason}")]
    Probe {
        /// Description of the fault.
        reason: String,
    },
}

/// Capabilities the state machine consumes from the test rig.
///
/// Implementations are used through `&mut dyn Hardware` from action
/// handlers, one call at a time.
pub trait Hardware {
    /// Types a sequence of keys, one press each.
    fn send_keys(&mut self, keys: &[Key]) -> Result<(), HardwareError>;

    /// Presses every key in `chord` together and holds them for `hold`.
    fn press_key(&mut self, chord: &[Key], hold: Duration) -> Result<(), HardwareError>;

    /// Confirms `pattern` is shown steadily for at least `minimum`, waiting
    /// up to `timeout` for it to settle.
    fn confirm_stable_indicator(
        &mut self,
        pattern: LedPattern,
        minimum: Duration,
        timeout: Duration,
    ) -> Result<bool, HardwareError>;

    /// Waits up to `timeout` for `pattern` to appear.
    fn await_indicator(&mut self, pattern: LedPattern, timeout: Duration)
    -> Result<bool, HardwareError>;

    /// Confirms the device enumerated on the host bus within `timeout`.
    fn confirm_enumeration(&mut self, timeout: Duration) -> Result<bool, HardwareError>;

    /// Switches the power relays.
    fn power(&mut self, state: PowerState) -> Result<(), HardwareError>;
}

/// Durations handed to hardware calls.
///
/// The engine has no clock. These only bound how long a single hardware
/// call may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Timeout for transient patterns (accept/reject blinks, prompts).
    pub indicator: Duration,
    /// Timeout for unlock enumeration patterns.
    pub unlock: Duration,
    /// Minimum time a solid pattern must hold to count as stable.
    pub stable_minimum: Duration,
    /// Timeout for a solid pattern to settle.
    pub stable_timeout: Duration,
    /// Timeout for host enumeration.
    pub enumeration: Duration,
    /// Hold time for long-press chords.
    pub long_press: Duration,
    /// Hold time for ordinary chords.
    pub short_press: Duration,
    /// How long the LEDs must stay dark to count as off.
    pub off_minimum: Duration,
    /// Timeout for the LEDs to go dark after power-off.
    pub off_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            indicator: Duration::from_secs(5),
            unlock: Duration::from_secs(15),
            stable_minimum: Duration::from_secs(3),
            stable_timeout: Duration::from_secs(10),
            enumeration: Duration::from_secs(15),
            long_press: Duration::from_secs(6),
            short_press: Duration::from_millis(200),
            off_minimum: Duration::from_secs(1),
            off_timeout: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_keys() {
        assert_eq!(Key::digit('0'), Some(Key::Key0));
        assert_eq!(Key::digit('9'), Some(Key::Key9));
        assert_eq!(Key::digit('x'), None);
    }

    #[test]
    fn long_press_is_longer_than_short_press() {
        let timing = TimingConfig::default();
        assert!(timing.long_press > timing.short_press);
        assert!(timing.stable_timeout > timing.stable_minimum);
    }

    #[test]
    fn pattern_display_uses_classifier_names() {
        assert_eq!(LedPattern::AdminMode.to_string(), "ADMIN_MODE");
        assert_eq!(LedPattern::GreenBlueState.to_string(), "GREEN_BLUE_STATE");
        assert_eq!(LedPattern::EnumLockOverrideReadOnly.to_string(), "ENUM_LOCK_OVERRIDE_READ_ONLY");
        assert_eq!(LedPattern::RedGreenBlue.to_string(), "RED_GREEN_BLUE");
    }

    #[test]
    fn hardware_error_display() {
        let err = HardwareError::Actuator { channel: "key5".into(), reason: "relay stuck".into() };
        assert_eq!(err.to_string(), "actuator fault on key5: relay stuck");
    }
}
