//! PIN values.
//!
//! A `Pin` is only syntactically checked on construction (digits, at most
//! [`MAX_PIN_DIGITS`] of them). Whether the device would accept it for a
//! given slot depends on the DUT configuration and is decided by
//! [`Dut::pin_acceptable`](crate::dut::Dut::pin_acceptable).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hardware::Key;

/// Longest PIN the keypad firmware stores.
pub const MAX_PIN_DIGITS: usize = 16;

const ASCENDING: &str = "0123456789";
const DESCENDING: &str = "9876543210";

/// Invalid PIN text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    /// No digits.
    #[error("PIN is empty")]
    Empty,

    /// More digits than the device stores.
    #[error("PIN has {len} digits, at most {MAX_PIN_DIGITS} allowed")]
    TooLong {
        /// Number of digits given.
        len: usize,
    },

    /// A character that is not a keypad digit.
    #[error("PIN contains non-digit {found:?}")]
    NonDigit {
        /// The offending character.
        found: char,
    },
}

/// A keypad PIN.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    /// Parses a PIN from its digits.
    pub fn new(digits: impl Into<String>) -> Result<Self, PinError> {
        let digits = digits.into();
        if digits.is_empty() {
            return Err(PinError::Empty);
        }
        if let Some(found) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(PinError::NonDigit { found });
        }
        if digits.len() > MAX_PIN_DIGITS {
            return Err(PinError::TooLong { len: digits.len() });
        }
        Ok(Self(digits))
    }

    /// The digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; PINs have at least one digit.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys to type to submit this PIN: its digits followed by `Unlock`.
    pub fn key_sequence(&self) -> Vec<Key> {
        self.0.chars().filter_map(Key::digit).chain(std::iter::once(Key::Unlock)).collect()
    }

    /// Whether the firmware refuses this PIN as trivially guessable.
    ///
    /// Trivial PINs repeat a single digit or are a run of the ascending or
    /// descending digit sequence.
    pub fn is_trivial(&self) -> bool {
        let bytes = self.0.as_bytes();
        let repeated = bytes.iter().all(|&b| b == bytes[0]);
        repeated || ASCENDING.contains(&self.0) || DESCENDING.contains(&self.0)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin({})", self.0)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pin {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Pin {
    type Error = PinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}
