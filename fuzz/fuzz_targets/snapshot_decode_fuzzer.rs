//! Fuzz target for [`DutSnapshot`] decoding
//!
//! Snapshots come back from disk and from other tools, so decoding must
//! survive any byte string.
//!
//! # Invariants
//!
//! - Decoding arbitrary bytes returns an error or a snapshot, never panics
//! - A decoded snapshot re-encodes and decodes to itself

#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_core::DutSnapshot;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = DutSnapshot::from_cbor(data) else {
        return;
    };
    let Ok(bytes) = snapshot.to_cbor() else {
        return;
    };
    let decoded = DutSnapshot::from_cbor(&bytes);
    assert_eq!(decoded.ok(), Some(snapshot));
});
