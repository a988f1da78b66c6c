//! Behavior model for PIN-protected storage devices.
//!
//! The machine predicts what a device under test (DUT) should do for each
//! stimulus a test rig applies, and confirms what it observes through the
//! [`Hardware`] boundary. It is the oracle that decides pass or fail.
//!
//! # Architecture
//!
//! The engine is Sans-IO. It never touches relays, cameras or the USB bus
//! itself:
//! - The driver fires [`Trigger`]s with a [`Payload`]
//! - The [`TransitionTable`] selects the first candidate whose guard passes
//! - Before-actions press keys and update the [`Dut`] model
//! - After-actions confirm LED patterns and enumeration
//! - Follow-up triggers come back to the driver in [`Fired::queued`]
//!
//! # Components
//!
//! - [`Machine`]: the engine and sole entry point ([`Machine::fire`])
//! - [`TransitionTable`]: ordered, introspectable transition records
//! - [`Dut`]: PIN slots, counters and feature flags
//! - [`Hardware`]: capabilities the rig provides
//! - [`DutSnapshot`]: serializable state for diagnostics and replay

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod dut;
mod error;
mod guards;
mod handlers;
pub mod hardware;
mod machine;
mod payload;
mod pin;
mod snapshot;
mod state;
pub mod table;
mod trigger;

pub use action::{Action, ActionContext, ActionError, ActionPhase};
pub use dut::{
    CounterKind,
    CredentialClass,
    DeviceProfile,
    Dut,
    Feature,
    PendingEnrollment,
    PinRejection,
    ProfileError,
};
pub use error::FireError;
pub use hardware::{Hardware, HardwareError, Key, LedPattern, PowerState, TimingConfig};
pub use machine::{Fired, HISTORY_LIMIT, Machine};
pub use payload::Payload;
pub use pin::{MAX_PIN_DIGITS, Pin, PinError};
pub use snapshot::{DutSnapshot, SnapshotError};
pub use state::{DeviceState, ParseStateError};
pub use table::{Guard, TableError, Transition, TransitionTable};
pub use trigger::{ParseTriggerError, Trigger};
