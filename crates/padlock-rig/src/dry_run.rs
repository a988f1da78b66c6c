//! Hardware adapter for rig runs without a rig.
//!
//! Every call is logged and answered from the scenario's script: patterns
//! listed under `refuse` are never confirmed, everything else is.

use std::{collections::HashSet, time::Duration};

use padlock_core::{Hardware, HardwareError, Key, LedPattern, PowerState};
use serde::{Deserialize, Serialize};

/// Scripted answers for a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareScript {
    /// Patterns that are never confirmed.
    pub refuse: Vec<LedPattern>,
    /// Whether the device enumerates on the host bus.
    pub enumerates: bool,
}

impl Default for HardwareScript {
    fn default() -> Self {
        Self { refuse: Vec::new(), enumerates: true }
    }
}

/// `Hardware` that logs instead of actuating.
#[derive(Debug)]
pub struct DryRunHardware {
    refused: HashSet<LedPattern>,
    enumerates: bool,
    calls: usize,
}

impl DryRunHardware {
    /// Adapter answering from `script`.
    pub fn new(script: &HardwareScript) -> Self {
        Self {
            refused: script.refuse.iter().copied().collect(),
            enumerates: script.enumerates,
            calls: 0,
        }
    }

    /// Number of hardware calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn confirms(&mut self, pattern: LedPattern) -> bool {
        self.calls += 1;
        let confirmed = !self.refused.contains(&pattern);
        tracing::debug!(%pattern, confirmed, "indicator check");
        confirmed
    }
}

impl Hardware for DryRunHardware {
    fn send_keys(&mut self, keys: &[Key]) -> Result<(), HardwareError> {
        self.calls += 1;
        tracing::debug!(?keys, "send keys");
        Ok(())
    }

    fn press_key(&mut self, chord: &[Key], hold: Duration) -> Result<(), HardwareError> {
        self.calls += 1;
        tracing::debug!(?chord, ?hold, "press chord");
        Ok(())
    }

    fn confirm_stable_indicator(
        &mut self,
        pattern: LedPattern,
        _minimum: Duration,
        _timeout: Duration,
    ) -> Result<bool, HardwareError> {
        Ok(self.confirms(pattern))
    }

    fn await_indicator(
        &mut self,
        pattern: LedPattern,
        _timeout: Duration,
    ) -> Result<bool, HardwareError> {
        Ok(self.confirms(pattern))
    }

    fn confirm_enumeration(&mut self, _timeout: Duration) -> Result<bool, HardwareError> {
        self.calls += 1;
        tracing::debug!(enumerates = self.enumerates, "enumeration check");
        Ok(self.enumerates)
    }

    fn power(&mut self, state: PowerState) -> Result<(), HardwareError> {
        self.calls += 1;
        tracing::debug!(?state, "power relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_only_scripted_patterns() {
        let script = HardwareScript { refuse: vec![LedPattern::Reject], enumerates: false };
        let mut hw = DryRunHardware::new(&script);

        assert!(!hw.await_indicator(LedPattern::Reject, Duration::ZERO).unwrap());
        assert!(hw.await_indicator(LedPattern::AcceptState, Duration::ZERO).unwrap());
        assert!(!hw.confirm_enumeration(Duration::ZERO).unwrap());
        assert_eq!(hw.calls(), 3);
    }
}
