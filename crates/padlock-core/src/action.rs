//! Action handler plumbing.
//!
//! Before- and after-actions are plain function pointers resolved when the
//! table is built. They run with an [`ActionContext`] that lends them the DUT,
//! the hardware and the payload for the duration of one `fire()` call. The
//! context holds no reference back to the machine, so a handler cannot fire
//! another trigger; it can only [`queue`](ActionContext::queue) one for the
//! driver.

use std::{fmt, time::Duration};

use thiserror::Error;

use crate::{
    dut::Dut,
    hardware::{Hardware, HardwareError, Key, LedPattern, PowerState, TimingConfig},
    payload::Payload,
    pin::Pin,
    state::DeviceState,
    trigger::Trigger,
};

/// Why an action did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The expected LED pattern was not observed before the timeout.
    #[error("LED pattern {pattern} not confirmed")]
    Unconfirmed {
        /// Pattern that was expected.
        pattern: LedPattern,
    },

    /// The device did not enumerate on the host.
    #[error("device did not enumerate")]
    NotEnumerated,

    /// The action needs a payload field the driver did not supply.
    #[error("payload field `{field}` is required")]
    MissingPayload {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The action needs a credential the DUT does not hold.
    #[error("no {credential} PIN enrolled")]
    MissingCredential {
        /// Which credential.
        credential: &'static str,
    },

    /// A failed attempt was asked to type a PIN the device would accept.
    #[error("PIN for a failed attempt is enrolled on the device")]
    EnrolledPin,

    /// The rig failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Which side of the commit an action runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// Before the new state is committed.
    Before,
    /// After the new state is committed.
    After,
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Handler signature.
pub type ActionFn = fn(&mut ActionContext<'_>) -> Result<(), ActionError>;

/// A named action handler.
#[derive(Clone, Copy)]
pub struct Action {
    /// Name shown in listings and logs.
    pub name: &'static str,
    /// Handler.
    pub run: ActionFn,
}

impl Action {
    /// Wraps a handler.
    pub const fn new(name: &'static str, run: ActionFn) -> Self {
        Self { name, run }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

/// What an action handler may touch during one `fire()`.
pub struct ActionContext<'a> {
    dut: &'a mut Dut,
    hardware: &'a mut dyn Hardware,
    payload: &'a Payload,
    timing: &'a TimingConfig,
    trigger: Trigger,
    source: DeviceState,
    dest: DeviceState,
    queued: &'a mut Vec<Trigger>,
}

impl<'a> ActionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        dut: &'a mut Dut,
        hardware: &'a mut dyn Hardware,
        payload: &'a Payload,
        timing: &'a TimingConfig,
        trigger: Trigger,
        source: DeviceState,
        dest: DeviceState,
        queued: &'a mut Vec<Trigger>,
    ) -> Self {
        Self { dut, hardware, payload, timing, trigger, source, dest, queued }
    }

    /// The DUT as it stands.
    pub fn dut(&self) -> &Dut {
        self.dut
    }

    pub(crate) fn dut_mut(&mut self) -> &mut Dut {
        self.dut
    }

    /// Trigger payload.
    pub fn payload(&self) -> &Payload {
        self.payload
    }

    /// Hardware timings.
    pub fn timing(&self) -> &TimingConfig {
        self.timing
    }

    /// Trigger being fired.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// State the transition leaves.
    pub fn source(&self) -> DeviceState {
        self.source
    }

    /// State the transition enters.
    pub fn dest(&self) -> DeviceState {
        self.dest
    }

    /// Asks the driver to fire `trigger` once this `fire()` returns.
    pub fn queue(&mut self, trigger: Trigger) {
        tracing::debug!(%trigger, "queued follow-up trigger");
        self.queued.push(trigger);
    }

    /// Types `keys` one at a time.
    pub fn keys(&mut self, keys: &[Key]) -> Result<(), ActionError> {
        tracing::debug!(?keys, "send keys");
        Ok(self.hardware.send_keys(keys)?)
    }

    /// Types a PIN followed by `Unlock`.
    pub fn type_pin(&mut self, pin: &Pin) -> Result<(), ActionError> {
        self.keys(&pin.key_sequence())
    }

    /// Short press of a key chord.
    pub fn chord(&mut self, chord: &[Key]) -> Result<(), ActionError> {
        let hold = self.timing.short_press;
        self.press(chord, hold)
    }

    /// Long press of a key chord.
    pub fn hold(&mut self, chord: &[Key]) -> Result<(), ActionError> {
        let hold = self.timing.long_press;
        self.press(chord, hold)
    }

    fn press(&mut self, chord: &[Key], hold: Duration) -> Result<(), ActionError> {
        tracing::debug!(?chord, ?hold, "press chord");
        Ok(self.hardware.press_key(chord, hold)?)
    }

    /// Waits for a transient pattern; not seeing it fails the action.
    pub fn expect(&mut self, pattern: LedPattern) -> Result<(), ActionError> {
        let timeout = self.timing.indicator;
        self.expect_within(pattern, timeout)
    }

    /// Like [`expect`](Self::expect) with an explicit timeout.
    pub fn expect_within(
        &mut self,
        pattern: LedPattern,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        if self.observe_within(pattern, timeout)? {
            Ok(())
        } else {
            Err(ActionError::Unconfirmed { pattern })
        }
    }

    /// Waits for a transient pattern and reports whether it appeared.
    pub fn observe(&mut self, pattern: LedPattern) -> Result<bool, ActionError> {
        let timeout = self.timing.indicator;
        self.observe_within(pattern, timeout)
    }

    fn observe_within(
        &mut self,
        pattern: LedPattern,
        timeout: Duration,
    ) -> Result<bool, ActionError> {
        let seen = self.hardware.await_indicator(pattern, timeout)?;
        tracing::debug!(%pattern, seen, "await indicator");
        Ok(seen)
    }

    /// Confirms a solid pattern with the default stability window.
    pub fn expect_stable(&mut self, pattern: LedPattern) -> Result<(), ActionError> {
        let (minimum, timeout) = (self.timing.stable_minimum, self.timing.stable_timeout);
        self.expect_stable_for(pattern, minimum, timeout)
    }

    /// Confirms a solid pattern held for `minimum` within `timeout`.
    pub fn expect_stable_for(
        &mut self,
        pattern: LedPattern,
        minimum: Duration,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        let stable = self.hardware.confirm_stable_indicator(pattern, minimum, timeout)?;
        tracing::debug!(%pattern, stable, "confirm stable indicator");
        if stable { Ok(()) } else { Err(ActionError::Unconfirmed { pattern }) }
    }

    /// Confirms the device enumerated on the host.
    pub fn expect_enumeration(&mut self) -> Result<(), ActionError> {
        let timeout = self.timing.enumeration;
        if self.hardware.confirm_enumeration(timeout)? {
            Ok(())
        } else {
            Err(ActionError::NotEnumerated)
        }
    }

    /// Switches the power relays.
    pub fn power(&mut self, state: PowerState) -> Result<(), ActionError> {
        tracing::debug!(?state, "power");
        Ok(self.hardware.power(state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_error_display() {
        let err = ActionError::Unconfirmed { pattern: LedPattern::AdminMode };
        assert_eq!(err.to_string(), "LED pattern ADMIN_MODE not confirmed");

        let err = ActionError::MissingPayload { field: "new_pin" };
        assert_eq!(err.to_string(), "payload field `new_pin` is required");
    }

    #[test]
    fn hardware_errors_pass_through() {
        let err: ActionError = HardwareError::Capture { reason: "camera gone".into() }.into();
        assert_eq!(err.to_string(), "indicator capture unavailable: camera gone");
    }
}
