//! Simulated rig hardware.
//!
//! `SimHardware` records every call the engine makes and answers
//! confirmations from a script. By default every confirmation succeeds.
//! Patterns can be refused permanently or once, rig faults can be queued,
//! and a seeded RNG can drop confirmations at a fixed rate.
//!
//! # Determinism
//!
//! The fault RNG is `ChaCha8Rng` seeded by the caller. The same seed and the
//! same call sequence give the same faults.

use std::{
    collections::{HashSet, VecDeque},
    time::Duration,
};

use padlock_core::{Hardware, HardwareError, Key, LedPattern, PowerState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One recorded hardware call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareCall {
    /// Keys typed one at a time.
    SendKeys(Vec<Key>),
    /// Chord pressed and held.
    PressKey {
        /// Keys held together.
        chord: Vec<Key>,
        /// Hold time.
        hold: Duration,
    },
    /// Stable pattern confirmation.
    ConfirmStable {
        /// Pattern expected.
        pattern: LedPattern,
        /// Answer given.
        confirmed: bool,
    },
    /// Transient pattern wait.
    AwaitIndicator {
        /// Pattern expected.
        pattern: LedPattern,
        /// Answer given.
        confirmed: bool,
    },
    /// Host enumeration check.
    ConfirmEnumeration {
        /// Answer given.
        confirmed: bool,
    },
    /// Power relay switch.
    Power(PowerState),
}

/// Seeded confirmation dropper.
#[derive(Debug, Clone)]
struct FaultInjector {
    rng: ChaCha8Rng,
    miss_rate: f64,
}

/// Scriptable `Hardware` double.
#[derive(Debug, Clone)]
pub struct SimHardware {
    calls: Vec<HardwareCall>,
    refused: HashSet<LedPattern>,
    refuse_once: VecDeque<LedPattern>,
    enumerates: bool,
    pending_faults: VecDeque<HardwareError>,
    faults: Option<FaultInjector>,
    power: PowerState,
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHardware {
    /// Hardware that confirms everything.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            refused: HashSet::new(),
            refuse_once: VecDeque::new(),
            enumerates: true,
            pending_faults: VecDeque::new(),
            faults: None,
            power: PowerState::Off,
        }
    }

    /// Hardware that misses each confirmation with probability `miss_rate`,
    /// driven by a seeded RNG.
    pub fn with_fault_rate(seed: u64, miss_rate: f64) -> Self {
        Self {
            faults: Some(FaultInjector {
                rng: ChaCha8Rng::seed_from_u64(seed),
                miss_rate: miss_rate.clamp(0.0, 1.0),
            }),
            ..Self::new()
        }
    }

    /// Never confirm `pattern`.
    pub fn refuse(&mut self, pattern: LedPattern) {
        self.refused.insert(pattern);
    }

    /// Confirm `pattern` again.
    pub fn allow(&mut self, pattern: LedPattern) {
        self.refused.remove(&pattern);
        self.refuse_once.retain(|p| *p != pattern);
    }

    /// Refuse the next confirmation of `pattern` only.
    pub fn refuse_once(&mut self, pattern: LedPattern) {
        self.refuse_once.push_back(pattern);
    }

    /// Whether the device shows up on the host bus.
    pub fn set_enumerates(&mut self, enumerates: bool) {
        self.enumerates = enumerates;
    }

    /// Fails the next hardware call with `error`.
    pub fn fail_next_call(&mut self, error: HardwareError) {
        self.pending_faults.push_back(error);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> &[HardwareCall] {
        &self.calls
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Current relay state.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Keys typed, concatenated.
    pub fn typed_keys(&self) -> Vec<Key> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HardwareCall::SendKeys(keys) => Some(keys.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// Chords pressed, in order.
    pub fn chords(&self) -> Vec<&[Key]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HardwareCall::PressKey { chord, .. } => Some(chord.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Patterns the engine waited for, in order.
    pub fn patterns_checked(&self) -> Vec<LedPattern> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HardwareCall::ConfirmStable { pattern, .. }
                | HardwareCall::AwaitIndicator { pattern, .. } => Some(*pattern),
                _ => None,
            })
            .collect()
    }

    fn take_fault(&mut self) -> Result<(), HardwareError> {
        match self.pending_faults.pop_front() {
            Some(error) => {
                tracing::debug!(%error, "injected rig fault");
                Err(error)
            },
            None => Ok(()),
        }
    }

    fn confirms(&mut self, pattern: Option<LedPattern>) -> bool {
        if let Some(pattern) = pattern {
            if self.refused.contains(&pattern) {
                return false;
            }
            if let Some(index) = self.refuse_once.iter().position(|p| *p == pattern) {
                self.refuse_once.remove(index);
                return false;
            }
        }
        match &mut self.faults {
            Some(faults) => !faults.rng.gen_bool(faults.miss_rate),
            None => true,
        }
    }
}

impl Hardware for SimHardware {
    fn send_keys(&mut self, keys: &[Key]) -> Result<(), HardwareError> {
        self.take_fault()?;
        self.calls.push(HardwareCall::SendKeys(keys.to_vec()));
        Ok(())
    }

    fn press_key(&mut self, chord: &[Key], hold: Duration) -> Result<(), HardwareError> {
        self.take_fault()?;
        self.calls.push(HardwareCall::PressKey { chord: chord.to_vec(), hold });
        Ok(())
    }

    fn confirm_stable_indicator(
        &mut self,
        pattern: LedPattern,
        _minimum: Duration,
        _timeout: Duration,
    ) -> Result<bool, HardwareError> {
        self.take_fault()?;
        let confirmed = self.confirms(Some(pattern));
        self.calls.push(HardwareCall::ConfirmStable { pattern, confirmed });
        Ok(confirmed)
    }

    fn await_indicator(
        &mut self,
        pattern: LedPattern,
        _timeout: Duration,
    ) -> Result<bool, HardwareError> {
        self.take_fault()?;
        let confirmed = self.confirms(Some(pattern));
        self.calls.push(HardwareCall::AwaitIndicator { pattern, confirmed });
        Ok(confirmed)
    }

    fn confirm_enumeration(&mut self, _timeout: Duration) -> Result<bool, HardwareError> {
        self.take_fault()?;
        let confirmed = self.enumerates && self.confirms(None);
        self.calls.push(HardwareCall::ConfirmEnumeration { confirmed });
        Ok(confirmed)
    }

    fn power(&mut self, state: PowerState) -> Result<(), HardwareError> {
        self.take_fault()?;
        self.power = state;
        self.calls.push(HardwareCall::Power(state));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirms_by_default() {
        let mut hw = SimHardware::new();
        assert!(hw.await_indicator(LedPattern::Reject, Duration::ZERO).unwrap());
        assert!(hw.confirm_enumeration(Duration::ZERO).unwrap());
    }

    #[test]
    fn refuse_once_applies_to_one_confirmation() {
        let mut hw = SimHardware::new();
        hw.refuse_once(LedPattern::AdminMode);
        let d = Duration::ZERO;
        assert!(!hw.confirm_stable_indicator(LedPattern::AdminMode, d, d).unwrap());
        assert!(hw.confirm_stable_indicator(LedPattern::AdminMode, d, d).unwrap());
    }

    #[test]
    fn queued_fault_fails_one_call() {
        let mut hw = SimHardware::new();
        hw.fail_next_call(HardwareError::Capture { reason: "lens cap".into() });
        assert!(hw.send_keys(&[Key::Key1]).is_err());
        assert!(hw.send_keys(&[Key::Key1]).is_ok());
        assert_eq!(hw.typed_keys(), vec![Key::Key1]);
    }

    #[test]
    fn fault_rate_is_reproducible() {
        let answers = |seed| {
            let mut hw = SimHardware::with_fault_rate(seed, 0.5);
            (0..32)
                .map(|_| hw.await_indicator(LedPattern::Enum, Duration::ZERO).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(answers(7), answers(7));
        assert!(answers(7).contains(&false));
    }
}
