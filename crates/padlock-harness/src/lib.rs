//! Simulation harness for the padlock behavior model.
//!
//! A scriptable [`SimHardware`] stands in for the rig so the machine can be
//! driven deterministically, with confirmations refused on demand or dropped
//! at a seeded rate.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and the real machine,
//! and their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_hardware;

pub use model::{ModelDevice, ObservableState, Operation, OperationResult, PinChoice};
pub use sim_hardware::{HardwareCall, SimHardware};
