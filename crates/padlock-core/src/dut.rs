//! Device-under-test model.
//!
//! `Dut` holds everything the device remembers: credential slots, counters
//! and feature flags. Guards read it through the pure predicates below;
//! action handlers change it through the `pub(crate)` mutators, which is the
//! only write path.
//!
//! # Invariants
//!
//! - Provision lock and self-destruct are never enabled together
//! - `brute_force_current <= brute_force_max`
//! - Forced user enrollment implies an admin PIN and an empty user slot
//! - `bricked` survives every reset

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pin::{MAX_PIN_DIGITS, Pin};

/// Invalid device profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Brute-force limit too small to have a midpoint.
    #[error("brute force limit must be at least 2, got {value}")]
    BruteForceLimit {
        /// Configured limit.
        value: u8,
    },

    /// PIN length bounds out of order or beyond the keypad maximum.
    #[error("invalid PIN length bounds {min}..={max}")]
    PinLength {
        /// Configured minimum.
        min: u8,
        /// Configured maximum.
        max: u8,
    },

    /// A slot bank with no slots.
    #[error("device needs at least one {kind} slot")]
    NoSlots {
        /// Which slot bank.
        kind: &'static str,
    },

    /// Zero recovery attempts would brick on the first lockout.
    #[error("recovery attempt limit must be at least 1")]
    RecoveryAttemptLimit,
}

/// Static properties of the device model under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceProfile {
    /// Number of user PIN slots.
    pub user_slots: u8,
    /// Number of recovery PIN slots.
    pub recovery_slots: u8,
    /// Factory brute-force limit.
    pub brute_force_max: u8,
    /// Factory minimum PIN length.
    pub min_pin_length: u8,
    /// Maximum PIN length.
    pub max_pin_length: u8,
    /// Failed recovery attempts before the device bricks.
    pub recovery_attempt_limit: u8,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            user_slots: 4,
            recovery_slots: 4,
            brute_force_max: 20,
            min_pin_length: 7,
            max_pin_length: 16,
            recovery_attempt_limit: 5,
        }
    }
}

impl DeviceProfile {
    /// Checks the profile describes a device the model can represent.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.brute_force_max < 2 {
            return Err(ProfileError::BruteForceLimit { value: self.brute_force_max });
        }
        let max_digits = u8::try_from(MAX_PIN_DIGITS).unwrap_or(u8::MAX);
        if self.min_pin_length == 0
            || self.min_pin_length > self.max_pin_length
            || self.max_pin_length > max_digits
        {
            return Err(ProfileError::PinLength {
                min: self.min_pin_length,
                max: self.max_pin_length,
            });
        }
        if self.user_slots == 0 {
            return Err(ProfileError::NoSlots { kind: "user" });
        }
        if self.recovery_slots == 0 {
            return Err(ProfileError::NoSlots { kind: "recovery" });
        }
        if self.recovery_attempt_limit == 0 {
            return Err(ProfileError::RecoveryAttemptLimit);
        }
        Ok(())
    }
}

/// Which kind of credential an unlock attempt used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialClass {
    /// Admin PIN (or an unknown PIN at the standby prompt).
    Admin,
    /// A user PIN.
    User,
    /// The self-destruct PIN.
    SelfDestruct,
    /// A recovery PIN during provision-lock recovery.
    Recovery,
}

/// Boolean device features the admin can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Provision lock.
    ProvisionLock,
    /// Self-destruct.
    SelfDestruct,
    /// User-forced enrollment.
    UserForcedEnrollment,
    /// Read-only media.
    ReadOnly,
    /// LED flicker on activity.
    LedFlicker,
    /// Lock override.
    LockOverride,
    /// Removable media descriptor.
    RemovableMedia,
    /// Basic disk descriptor.
    BasicDisk,
}

/// PIN slot kind awaiting enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingEnrollment {
    /// Admin PIN.
    Admin,
    /// Next empty user slot.
    User,
    /// Next empty recovery slot.
    Recovery,
    /// Self-destruct PIN.
    SelfDestruct,
}

/// Counter awaiting enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Brute-force limit.
    BruteForce,
    /// Minimum PIN length.
    MinPinLength,
    /// Unattended auto-lock interval.
    UnattendedAutoLock,
}

impl CounterKind {
    /// Number of digits the device expects for this counter.
    pub const fn digits(self) -> usize {
        match self {
            Self::BruteForce | Self::MinPinLength => 2,
            Self::UnattendedAutoLock => 1,
        }
    }
}

/// Why a PIN would be refused at enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PinRejection {
    /// Shorter than the enrolled minimum length.
    #[error("shorter than {min} digits")]
    TooShort {
        /// Minimum length in force.
        min: u8,
    },
    /// Longer than the profile maximum.
    #[error("longer than {max} digits")]
    TooLong {
        /// Maximum length.
        max: u8,
    },
    /// Repeated or sequential digits.
    #[error("trivially guessable")]
    Trivial,
    /// Already enrolled in another slot.
    #[error("already in use by another slot")]
    InUse,
}

/// Counter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Failed unlocks allowed before full lockout.
    pub brute_force_max: u8,
    /// Failed unlocks in the current lockout episode.
    pub brute_force_current: u8,
    /// Minimum PIN length in force.
    pub min_pin_length: u8,
    /// Failed recovery logins since exhaustion.
    pub admin_recovery_attempts: u8,
    /// Unattended auto-lock setting (0 disables).
    pub unattended_auto_lock: u8,
}

/// Feature flag values.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Provision lock enabled.
    pub provision_lock: bool,
    /// Self-destruct enabled.
    pub self_destruct_enabled: bool,
    /// User-forced enrollment armed.
    pub user_forced_enrollment: bool,
    /// Media is read-only.
    pub read_only: bool,
    /// LED flicker enabled.
    pub led_flicker: bool,
    /// Lock override enabled.
    pub lock_override: bool,
    /// Removable media descriptor.
    pub removable_media: bool,
    /// Basic disk descriptor.
    pub basic_disk: bool,
}

/// The modeled device state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dut {
    profile: DeviceProfile,
    admin_pin: Option<Pin>,
    user_pins: Vec<Option<Pin>>,
    recovery_pins: Vec<Option<Pin>>,
    self_destruct_pin: Option<Pin>,
    counters: Counters,
    flags: FeatureFlags,
    last_try_used: bool,
    bricked: bool,
    self_destruct_used: bool,
    pending_enrollment: Option<PendingEnrollment>,
    pending_counter: Option<CounterKind>,
}

impl Default for Dut {
    fn default() -> Self {
        Self::factory(DeviceProfile::default())
    }
}

impl Dut {
    /// Factory-default DUT for `profile`.
    pub fn new(profile: DeviceProfile) -> Result<Self, ProfileError> {
        profile.validate()?;
        Ok(Self::factory(profile))
    }

    fn factory(profile: DeviceProfile) -> Self {
        Self {
            admin_pin: None,
            user_pins: vec![None; usize::from(profile.user_slots)],
            recovery_pins: vec![None; usize::from(profile.recovery_slots)],
            self_destruct_pin: None,
            counters: Counters {
                brute_force_max: profile.brute_force_max,
                brute_force_current: 0,
                min_pin_length: profile.min_pin_length,
                admin_recovery_attempts: 0,
                unattended_auto_lock: 0,
            },
            flags: FeatureFlags::default(),
            last_try_used: false,
            bricked: false,
            self_destruct_used: false,
            pending_enrollment: None,
            pending_counter: None,
            profile,
        }
    }

    /// Device profile.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Enrolled admin PIN.
    pub fn admin_pin(&self) -> Option<&Pin> {
        self.admin_pin.as_ref()
    }

    /// User PIN slots, slot 1 first.
    pub fn user_pins(&self) -> &[Option<Pin>] {
        &self.user_pins
    }

    /// Recovery PIN slots.
    pub fn recovery_pins(&self) -> &[Option<Pin>] {
        &self.recovery_pins
    }

    /// Enrolled self-destruct PIN.
    pub fn self_destruct_pin(&self) -> Option<&Pin> {
        self.self_destruct_pin.as_ref()
    }

    /// Counter values.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Feature flags.
    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    /// Whether the last-try attempt of the current episode was used.
    pub fn last_try_used(&self) -> bool {
        self.last_try_used
    }

    /// Whether the device is permanently bricked.
    pub fn is_bricked(&self) -> bool {
        self.bricked
    }

    /// Whether the self-destruct PIN has ever been used.
    pub fn self_destruct_used(&self) -> bool {
        self.self_destruct_used
    }

    /// PIN slot awaiting enrollment.
    pub fn pending_enrollment(&self) -> Option<PendingEnrollment> {
        self.pending_enrollment
    }

    /// Counter awaiting enrollment.
    pub fn pending_counter(&self) -> Option<CounterKind> {
        self.pending_counter
    }

    /// Number of enrolled user PINs.
    pub fn enrolled_users(&self) -> usize {
        self.user_pins.iter().flatten().count()
    }

    // Guard predicates

    /// An admin PIN is enrolled.
    pub fn has_admin_pin(&self) -> bool {
        self.admin_pin.is_some()
    }

    /// Failure count sits at the last-try threshold.
    pub fn brute_force_at_midpoint(&self) -> bool {
        self.counters.brute_force_current == self.brute_force_midpoint()
    }

    /// Failure count reached the limit.
    pub fn brute_force_exhausted(&self) -> bool {
        self.counters.brute_force_current >= self.counters.brute_force_max
    }

    /// Last-try threshold, `brute_force_max / 2`.
    pub fn brute_force_midpoint(&self) -> u8 {
        self.counters.brute_force_max / 2
    }

    /// The single last-try attempt can still be used.
    pub fn last_try_available(&self) -> bool {
        self.brute_force_at_midpoint() && !self.last_try_used && !self.brute_force_exhausted()
    }

    /// Powering up lands in brute-force lockout.
    pub fn brute_force_locked(&self) -> bool {
        self.brute_force_exhausted() || self.last_try_available()
    }

    /// Provision lock enabled.
    pub fn provision_lock_active(&self) -> bool {
        self.flags.provision_lock
    }

    /// Self-destruct feature enabled.
    pub fn self_destruct_enabled(&self) -> bool {
        self.flags.self_destruct_enabled
    }

    /// Self-destruct enabled and a self-destruct PIN enrolled.
    pub fn self_destruct_active(&self) -> bool {
        self.flags.self_destruct_enabled && self.self_destruct_pin.is_some()
    }

    /// Forced user enrollment armed.
    pub fn user_forced_enrollment(&self) -> bool {
        self.flags.user_forced_enrollment
    }

    /// Some user slot is empty.
    pub fn empty_user_slot_exists(&self) -> bool {
        self.user_pins.iter().any(Option::is_none)
    }

    /// Some recovery slot is empty.
    pub fn empty_recovery_slot_exists(&self) -> bool {
        self.recovery_pins.iter().any(Option::is_none)
    }

    /// The 1-based user slot holds a PIN.
    pub fn user_slot_enrolled(&self, user_id: u8) -> bool {
        self.user_pin(user_id).is_some()
    }

    /// PIN in the 1-based user slot.
    pub fn user_pin(&self, user_id: u8) -> Option<&Pin> {
        let index = usize::from(user_id).checked_sub(1)?;
        self.user_pins.get(index)?.as_ref()
    }

    /// Index of the recovery slot holding `pin`.
    pub fn recovery_slot_for(&self, pin: &Pin) -> Option<usize> {
        self.recovery_pins.iter().position(|slot| slot.as_ref() == Some(pin))
    }

    /// Exhausted under provision lock: only recovery PINs are accepted.
    pub fn awaiting_admin_recovery(&self) -> bool {
        self.flags.provision_lock && self.brute_force_exhausted()
    }

    /// The next failed recovery login bricks the device.
    pub fn recovery_attempts_exhausted_next(&self) -> bool {
        self.counters.admin_recovery_attempts.saturating_add(1)
            >= self.profile.recovery_attempt_limit
    }

    /// The slot kind can take a new PIN.
    pub fn slot_available(&self, kind: PendingEnrollment) -> bool {
        match kind {
            PendingEnrollment::Admin => true,
            PendingEnrollment::User => self.empty_user_slot_exists(),
            PendingEnrollment::Recovery => self.empty_recovery_slot_exists(),
            PendingEnrollment::SelfDestruct => self.flags.self_destruct_enabled,
        }
    }

    /// Why the device would refuse `pin` for a `kind` slot, if it would.
    pub fn pin_rejection(&self, pin: &Pin, kind: PendingEnrollment) -> Option<PinRejection> {
        let len = pin.len();
        if len < usize::from(self.counters.min_pin_length) {
            return Some(PinRejection::TooShort { min: self.counters.min_pin_length });
        }
        if len > usize::from(self.profile.max_pin_length) {
            return Some(PinRejection::TooLong { max: self.profile.max_pin_length });
        }
        if pin.is_trivial() {
            return Some(PinRejection::Trivial);
        }
        let replaced = match kind {
            PendingEnrollment::Admin => self.admin_pin.as_ref(),
            PendingEnrollment::SelfDestruct => self.self_destruct_pin.as_ref(),
            PendingEnrollment::User | PendingEnrollment::Recovery => None,
        };
        let in_use = self.enrolled_pins().any(|enrolled| enrolled == pin && Some(enrolled) != replaced);
        in_use.then_some(PinRejection::InUse)
    }

    /// The device would accept `pin` for a `kind` slot.
    pub fn pin_acceptable(&self, pin: &Pin, kind: PendingEnrollment) -> bool {
        self.pin_rejection(pin, kind).is_none()
    }

    /// The device would accept `value` for the counter.
    pub fn counter_acceptable(&self, kind: CounterKind, value: u8) -> bool {
        match kind {
            CounterKind::BruteForce => (2..=10).contains(&value),
            CounterKind::MinPinLength => {
                (self.profile.min_pin_length..=self.profile.max_pin_length).contains(&value)
            },
            CounterKind::UnattendedAutoLock => value <= 3,
        }
    }

    /// `pin` opens one of the enrolled slots.
    pub fn is_enrolled(&self, pin: &Pin) -> bool {
        self.enrolled_pins().any(|enrolled| enrolled == pin)
    }

    fn enrolled_pins(&self) -> impl Iterator<Item = &Pin> {
        self.admin_pin
            .iter()
            .chain(self.user_pins.iter().flatten())
            .chain(self.recovery_pins.iter().flatten())
            .chain(self.self_destruct_pin.iter())
    }

    // Mutators, reachable only from action handlers

    pub(crate) fn begin_enrollment(&mut self, kind: PendingEnrollment) {
        self.pending_enrollment = Some(kind);
    }

    pub(crate) fn take_pending_enrollment(&mut self) -> Option<PendingEnrollment> {
        self.pending_enrollment.take()
    }

    pub(crate) fn begin_counter(&mut self, kind: CounterKind) {
        self.pending_counter = Some(kind);
    }

    pub(crate) fn take_pending_counter(&mut self) -> Option<CounterKind> {
        self.pending_counter.take()
    }

    pub(crate) fn enroll_admin_pin(&mut self, pin: Pin) {
        self.admin_pin = Some(pin);
    }

    /// Stores `pin` in the first empty user slot and returns its 1-based id.
    ///
    /// Any user enrollment satisfies a pending forced enrollment.
    pub(crate) fn enroll_user_pin(&mut self, pin: Pin) -> Option<u8> {
        let index = self.user_pins.iter().position(Option::is_none)?;
        self.user_pins[index] = Some(pin);
        self.flags.user_forced_enrollment = false;
        u8::try_from(index + 1).ok()
    }

    pub(crate) fn enroll_recovery_pin(&mut self, pin: Pin) -> Option<usize> {
        let index = self.recovery_pins.iter().position(Option::is_none)?;
        self.recovery_pins[index] = Some(pin);
        Some(index)
    }

    pub(crate) fn enroll_self_destruct_pin(&mut self, pin: Pin) {
        self.self_destruct_pin = Some(pin);
    }

    /// Records a failed attempt and returns the updated counter for that
    /// credential class.
    pub(crate) fn record_failed_unlock(&mut self, class: CredentialClass) -> u8 {
        match class {
            CredentialClass::Recovery => {
                self.counters.admin_recovery_attempts =
                    self.counters.admin_recovery_attempts.saturating_add(1);
                self.counters.admin_recovery_attempts
            },
            CredentialClass::Admin | CredentialClass::User | CredentialClass::SelfDestruct => {
                self.counters.brute_force_current = self
                    .counters
                    .brute_force_current
                    .saturating_add(1)
                    .min(self.counters.brute_force_max);
                self.counters.brute_force_current
            },
        }
    }

    pub(crate) fn spend_last_try(&mut self) {
        self.last_try_used = true;
    }

    pub(crate) fn exhaust_brute_force(&mut self) {
        self.counters.brute_force_current = self.counters.brute_force_max;
    }

    /// Ends the lockout episode.
    pub(crate) fn reset_brute_force(&mut self) {
        self.counters.brute_force_current = 0;
        self.counters.admin_recovery_attempts = 0;
        self.last_try_used = false;
    }

    pub(crate) fn set_feature(&mut self, feature: Feature, value: bool) {
        let flag = match feature {
            Feature::ProvisionLock => &mut self.flags.provision_lock,
            Feature::SelfDestruct => &mut self.flags.self_destruct_enabled,
            Feature::UserForcedEnrollment => &mut self.flags.user_forced_enrollment,
            Feature::ReadOnly => &mut self.flags.read_only,
            Feature::LedFlicker => &mut self.flags.led_flicker,
            Feature::LockOverride => &mut self.flags.lock_override,
            Feature::RemovableMedia => &mut self.flags.removable_media,
            Feature::BasicDisk => &mut self.flags.basic_disk,
        };
        *flag = value;
    }

    pub(crate) fn feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::ProvisionLock => self.flags.provision_lock,
            Feature::SelfDestruct => self.flags.self_destruct_enabled,
            Feature::UserForcedEnrollment => self.flags.user_forced_enrollment,
            Feature::ReadOnly => self.flags.read_only,
            Feature::LedFlicker => self.flags.led_flicker,
            Feature::LockOverride => self.flags.lock_override,
            Feature::RemovableMedia => self.flags.removable_media,
            Feature::BasicDisk => self.flags.basic_disk,
        }
    }

    /// Applies an accepted counter value.
    ///
    /// A new brute-force limit starts a fresh episode.
    pub(crate) fn set_counter(&mut self, kind: CounterKind, value: u8) {
        match kind {
            CounterKind::BruteForce => {
                self.counters.brute_force_max = value;
                self.reset_brute_force();
            },
            CounterKind::MinPinLength => self.counters.min_pin_length = value,
            CounterKind::UnattendedAutoLock => self.counters.unattended_auto_lock = value,
        }
    }

    /// Recovery PINs are single use.
    pub(crate) fn consume_recovery_pin(&mut self, index: usize) {
        if let Some(slot) = self.recovery_pins.get_mut(index) {
            *slot = None;
        }
    }

    pub(crate) fn brick(&mut self) {
        self.bricked = true;
    }

    /// The self-destruct PIN becomes the admin PIN and every other
    /// credential is wiped.
    pub(crate) fn self_destruct(&mut self) {
        self.admin_pin = self.self_destruct_pin.take();
        self.user_pins.iter_mut().for_each(|slot| *slot = None);
        self.recovery_pins.iter_mut().for_each(|slot| *slot = None);
        self.flags.self_destruct_enabled = false;
        self.flags.user_forced_enrollment = false;
        self.self_destruct_used = true;
        self.reset_brute_force();
    }

    /// Clears user, recovery and self-destruct PINs. The admin PIN stays.
    pub(crate) fn delete_pins(&mut self) {
        self.user_pins.iter_mut().for_each(|slot| *slot = None);
        self.recovery_pins.iter_mut().for_each(|slot| *slot = None);
        self.self_destruct_pin = None;
        self.flags.user_forced_enrollment = false;
    }

    /// Back to factory defaults. Bricked status is persistent.
    pub(crate) fn factory_reset(&mut self) {
        let bricked = self.bricked;
        *self = Self::factory(self.profile.clone());
        self.bricked = bricked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(digits: &str) -> Pin {
        Pin::new(digits).unwrap()
    }

    fn small_profile() -> DeviceProfile {
        DeviceProfile { brute_force_max: 4, ..DeviceProfile::default() }
    }

    #[test]
    fn default_profile_is_valid() {
        assert_eq!(DeviceProfile::default().validate(), Ok(()));
    }

    #[test]
    fn profile_rejects_tiny_brute_force_limit() {
        let profile = DeviceProfile { brute_force_max: 1, ..DeviceProfile::default() };
        assert_eq!(Dut::new(profile), Err(ProfileError::BruteForceLimit { value: 1 }));
    }

    #[test]
    fn profile_rejects_inverted_pin_bounds() {
        let profile =
            DeviceProfile { min_pin_length: 9, max_pin_length: 8, ..DeviceProfile::default() };
        assert_eq!(profile.validate(), Err(ProfileError::PinLength { min: 9, max: 8 }));
    }

    #[test]
    fn profile_rejects_empty_slot_banks() {
        let profile = DeviceProfile { recovery_slots: 0, ..DeviceProfile::default() };
        assert_eq!(profile.validate(), Err(ProfileError::NoSlots { kind: "recovery" }));
    }

    #[test]
    fn factory_dut_is_out_of_box() {
        let dut = Dut::default();
        assert!(!dut.has_admin_pin());
        assert_eq!(dut.user_pins().len(), 4);
        assert!(dut.empty_user_slot_exists());
        assert!(!dut.brute_force_locked());
    }

    #[test]
    fn failed_unlocks_reach_midpoint_then_saturate() {
        let mut dut = Dut::new(small_profile()).unwrap();
        assert_eq!(dut.record_failed_unlock(CredentialClass::Admin), 1);
        assert!(!dut.brute_force_at_midpoint());
        assert_eq!(dut.record_failed_unlock(CredentialClass::User), 2);
        assert!(dut.brute_force_at_midpoint());
        assert!(dut.last_try_available());
        assert!(dut.brute_force_locked());

        dut.spend_last_try();
        assert!(!dut.last_try_available());
        assert!(!dut.brute_force_locked());

        dut.exhaust_brute_force();
        assert!(dut.brute_force_exhausted());
        assert_eq!(dut.record_failed_unlock(CredentialClass::Admin), 4);
    }

    #[test]
    fn recovery_failures_use_their_own_counter() {
        let mut dut = Dut::new(small_profile()).unwrap();
        assert_eq!(dut.record_failed_unlock(CredentialClass::Recovery), 1);
        assert_eq!(dut.counters().brute_force_current, 0);
        for _ in 0..3 {
            dut.record_failed_unlock(CredentialClass::Recovery);
        }
        assert!(dut.recovery_attempts_exhausted_next());
    }

    #[test]
    fn reset_brute_force_ends_episode() {
        let mut dut = Dut::new(small_profile()).unwrap();
        dut.record_failed_unlock(CredentialClass::Admin);
        dut.record_failed_unlock(CredentialClass::Admin);
        dut.spend_last_try();
        dut.record_failed_unlock(CredentialClass::Recovery);
        dut.reset_brute_force();
        assert_eq!(dut.counters().brute_force_current, 0);
        assert_eq!(dut.counters().admin_recovery_attempts, 0);
        assert!(!dut.last_try_used());
    }

    #[test]
    fn pin_rejection_reasons() {
        let mut dut = Dut::default();
        dut.enroll_admin_pin(pin("1357924"));

        assert_eq!(
            dut.pin_rejection(&pin("135792"), PendingEnrollment::User),
            Some(PinRejection::TooShort { min: 7 })
        );
        assert_eq!(
            dut.pin_rejection(&pin("7777777"), PendingEnrollment::User),
            Some(PinRejection::Trivial)
        );
        assert_eq!(
            dut.pin_rejection(&pin("1357924"), PendingEnrollment::User),
            Some(PinRejection::InUse)
        );
        assert_eq!(dut.pin_rejection(&pin("1357924"), PendingEnrollment::Admin), None);
        assert!(dut.pin_acceptable(&pin("86420975"), PendingEnrollment::Recovery));
    }

    #[test]
    fn counter_ranges() {
        let dut = Dut::default();
        assert!(!dut.counter_acceptable(CounterKind::BruteForce, 1));
        assert!(dut.counter_acceptable(CounterKind::BruteForce, 10));
        assert!(!dut.counter_acceptable(CounterKind::BruteForce, 11));
        assert!(!dut.counter_acceptable(CounterKind::MinPinLength, 6));
        assert!(dut.counter_acceptable(CounterKind::MinPinLength, 16));
        assert!(dut.counter_acceptable(CounterKind::UnattendedAutoLock, 0));
        assert!(!dut.counter_acceptable(CounterKind::UnattendedAutoLock, 4));
    }

    #[test]
    fn new_brute_force_limit_starts_fresh_episode() {
        let mut dut = Dut::default();
        dut.record_failed_unlock(CredentialClass::Admin);
        dut.set_counter(CounterKind::BruteForce, 6);
        assert_eq!(dut.counters().brute_force_max, 6);
        assert_eq!(dut.counters().brute_force_current, 0);
    }

    #[test]
    fn user_enrollment_fills_first_empty_slot_and_clears_forced_enrollment() {
        let mut dut = Dut::default();
        dut.enroll_admin_pin(pin("1357924"));
        dut.set_feature(Feature::UserForcedEnrollment, true);
        assert_eq!(dut.enroll_user_pin(pin("2468013")), Some(1));
        assert_eq!(dut.enroll_user_pin(pin("3579135")), Some(2));
        assert!(!dut.user_forced_enrollment());
        assert!(dut.user_slot_enrolled(2));
        assert!(!dut.user_slot_enrolled(0));
        assert!(!dut.user_slot_enrolled(9));
    }

    #[test]
    fn self_destruct_promotes_pin_and_wipes_the_rest() {
        let mut dut = Dut::default();
        dut.enroll_admin_pin(pin("1357924"));
        dut.enroll_user_pin(pin("2468013"));
        dut.enroll_recovery_pin(pin("9081726"));
        dut.set_feature(Feature::SelfDestruct, true);
        dut.enroll_self_destruct_pin(pin("5647382"));
        assert!(dut.self_destruct_active());

        dut.self_destruct();

        assert_eq!(dut.admin_pin(), Some(&pin("5647382")));
        assert_eq!(dut.enrolled_users(), 0);
        assert!(dut.recovery_pins().iter().all(Option::is_none));
        assert!(!dut.self_destruct_enabled());
        assert!(dut.self_destruct_pin().is_none());
        assert!(dut.self_destruct_used());
    }

    #[test]
    fn delete_pins_keeps_admin() {
        let mut dut = Dut::default();
        dut.enroll_admin_pin(pin("1357924"));
        dut.enroll_user_pin(pin("2468013"));
        dut.enroll_self_destruct_pin(pin("5647382"));
        dut.delete_pins();
        assert!(dut.has_admin_pin());
        assert_eq!(dut.enrolled_users(), 0);
        assert!(dut.self_destruct_pin().is_none());
    }

    #[test]
    fn factory_reset_keeps_bricked_and_profile() {
        let mut dut = Dut::new(small_profile()).unwrap();
        dut.enroll_admin_pin(pin("1357924"));
        dut.set_feature(Feature::ProvisionLock, true);
        dut.brick();
        dut.factory_reset();
        assert!(dut.is_bricked());
        assert!(!dut.has_admin_pin());
        assert!(!dut.provision_lock_active());
        assert_eq!(dut.profile(), &small_profile());
    }

    #[test]
    fn recovery_pins_are_single_use() {
        let mut dut = Dut::default();
        let index = dut.enroll_recovery_pin(pin("9081726")).unwrap();
        assert_eq!(dut.recovery_slot_for(&pin("9081726")), Some(index));
        dut.consume_recovery_pin(index);
        assert_eq!(dut.recovery_slot_for(&pin("9081726")), None);
    }
}
