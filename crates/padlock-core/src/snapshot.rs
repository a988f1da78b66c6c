//! Serializable machine snapshots.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{dut::Dut, state::DeviceState};

/// Snapshot encoding or decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// CBOR encoding failed.
    #[error("failed to encode snapshot: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },

    /// CBOR decoding failed.
    #[error("failed to decode snapshot: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },
}

/// Current state plus every DUT field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutSnapshot {
    /// Machine state when the snapshot was taken.
    pub state: DeviceState,
    /// The DUT model.
    pub dut: Dut,
}

impl DutSnapshot {
    /// Encodes as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| SnapshotError::Encode { reason: e.to_string() })?;
        Ok(buf)
    }

    /// Decodes from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, SnapshotError> {
        ciborium::from_reader(bytes).map_err(|e| SnapshotError::Decode { reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dut::DeviceProfile, pin::Pin};

    #[test]
    fn cbor_preserves_enrolled_state() {
        let mut dut = Dut::new(DeviceProfile::default()).unwrap();
        dut.enroll_admin_pin(Pin::new("1357924").unwrap());
        let snapshot = DutSnapshot { state: DeviceState::Standby, dut };

        let bytes = snapshot.to_cbor().unwrap();
        assert_eq!(DutSnapshot::from_cbor(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn truncated_cbor_is_a_decode_error() {
        let snapshot = DutSnapshot { state: DeviceState::Oob, dut: Dut::default() };
        let bytes = snapshot.to_cbor().unwrap();
        let err = DutSnapshot::from_cbor(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode { .. }));
    }
}
