//! Reference model for model-based testing.
//!
//! The model is a plain restatement of the device rules with no transition
//! table, guards or hardware. It serves as the oracle against which the
//! real machine is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Rules, not mechanism: Captures WHAT the device does, not HOW the rig
//!   drives it
//! - Deterministic: Same inputs produce same outputs

mod device;
pub mod operation;

pub use device::{ModelDevice, ObservableState};
pub use operation::{Operation, OperationResult, PinChoice};
