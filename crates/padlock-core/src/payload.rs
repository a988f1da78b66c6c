//! Trigger payloads.

use serde::{Deserialize, Serialize};

use crate::pin::Pin;

/// Arguments that accompany a trigger.
///
/// Every field is optional; guards and actions read only what their trigger
/// needs. Scenario files deserialize directly into this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Payload {
    /// 1-based user slot for `unlock_user`.
    pub user_id: Option<u8>,
    /// PIN typed at the keypad (`fail_unlock`, `admin_recovery_login`,
    /// `fail_admin_recovery`).
    pub pin: Option<Pin>,
    /// New PIN for `enroll_pin` and forced user enrollment.
    pub new_pin: Option<Pin>,
    /// Confirmation entry; defaults to `new_pin`.
    pub confirm_pin: Option<Pin>,
    /// Counter value for `enroll_counter`.
    pub new_counter: Option<u8>,
    /// Connect USB 3 data lines on `power_on` (default true).
    pub usb3: Option<bool>,
}

impl Payload {
    /// Empty payload.
    pub fn none() -> Self {
        Self::default()
    }

    /// Payload selecting a user slot.
    pub fn user(user_id: u8) -> Self {
        Self { user_id: Some(user_id), ..Self::default() }
    }

    /// Payload carrying a typed PIN.
    pub fn pin(pin: Pin) -> Self {
        Self { pin: Some(pin), ..Self::default() }
    }

    /// Payload carrying a new PIN, confirmed with the same digits.
    pub fn new_pin(pin: Pin) -> Self {
        Self { new_pin: Some(pin), ..Self::default() }
    }

    /// Payload carrying a counter value.
    pub fn counter(value: u8) -> Self {
        Self { new_counter: Some(value), ..Self::default() }
    }

    /// The confirmation entry: `confirm_pin` if given, else `new_pin`.
    pub fn confirmation(&self) -> Option<&Pin> {
        self.confirm_pin.as_ref().or(self.new_pin.as_ref())
    }

    /// Whether the confirmation entry matches the new PIN.
    pub fn confirmation_matches(&self) -> bool {
        match (&self.new_pin, self.confirmation()) {
            (Some(new), Some(confirm)) => new == confirm,
            _ => false,
        }
    }

    /// USB 3 flag with its default applied.
    pub fn usb3(&self) -> bool {
        self.usb3.unwrap_or(true)
    }
}
