//! Guard predicates used by the device table.
//!
//! Each guard is a pure function of the DUT and the payload. The names are
//! what `GuardRejected` reports and what the table listing prints.

use crate::{
    dut::{Dut, PendingEnrollment},
    payload::Payload,
    table::Guard,
};

pub(crate) const BRICKED: Guard = Guard::new("bricked", |dut, _| dut.is_bricked());

pub(crate) const BRUTE_FORCE_LOCKED: Guard =
    Guard::new("brute_force_locked", |dut, _| dut.brute_force_locked());

pub(crate) const USER_FORCED_ENROLLMENT: Guard =
    Guard::new("user_forced_enrollment", |dut, _| dut.user_forced_enrollment());

pub(crate) const HAS_ADMIN_PIN: Guard = Guard::new("has_admin_pin", |dut, _| dut.has_admin_pin());

pub(crate) const NO_ADMIN_PIN: Guard = Guard::new("no_admin_pin", |dut, _| !dut.has_admin_pin());

pub(crate) const PROVISION_LOCK_INACTIVE: Guard =
    Guard::new("provision_lock_inactive", |dut, _| !dut.provision_lock_active());

pub(crate) const SELF_DESTRUCT_INACTIVE: Guard =
    Guard::new("self_destruct_inactive", |dut, _| !dut.self_destruct_enabled());

pub(crate) const SELF_DESTRUCT_ENABLED: Guard =
    Guard::new("self_destruct_enabled", |dut, _| dut.self_destruct_enabled());

pub(crate) const SELF_DESTRUCT_ACTIVE: Guard =
    Guard::new("self_destruct_active", |dut, _| dut.self_destruct_active());

pub(crate) const USER_SLOT_ENROLLED: Guard = Guard::new("user_slot_enrolled", |dut, payload| {
    payload.user_id.is_some_and(|id| dut.user_slot_enrolled(id))
});

pub(crate) const EMPTY_USER_SLOT: Guard =
    Guard::new("empty_user_slot", |dut, _| dut.empty_user_slot_exists());

pub(crate) const EMPTY_RECOVERY_SLOT: Guard =
    Guard::new("empty_recovery_slot", |dut, _| dut.empty_recovery_slot_exists());

pub(crate) const FORCED_ENROLLMENT_ARMABLE: Guard =
    Guard::new("forced_enrollment_armable", |dut, _| {
        !dut.user_forced_enrollment() && dut.empty_user_slot_exists()
    });

pub(crate) const FORCED_ENROLLMENT_INACTIVE: Guard =
    Guard::new("forced_enrollment_inactive", |dut, _| !dut.user_forced_enrollment());

pub(crate) const LAST_TRY_SPENT_WITH_PROVISION_LOCK: Guard =
    Guard::new("last_try_spent_with_provision_lock", |dut, _| {
        dut.last_try_used() && dut.provision_lock_active()
    });

pub(crate) const LAST_TRY_SPENT: Guard = Guard::new("last_try_spent", |dut, _| dut.last_try_used());

/// The failure being recorded is the one that reaches the last-try
/// threshold.
pub(crate) const FAILURE_REACHES_MIDPOINT: Guard =
    Guard::new("failure_reaches_midpoint", |dut, _| {
        !dut.last_try_used()
            && dut.counters().brute_force_current.saturating_add(1) >= dut.brute_force_midpoint()
    });

pub(crate) const LAST_TRY_AVAILABLE_WITH_UFE: Guard =
    Guard::new("last_try_available_with_ufe", |dut, _| {
        dut.last_try_available() && dut.user_forced_enrollment()
    });

pub(crate) const LAST_TRY_AVAILABLE: Guard =
    Guard::new("last_try_available", |dut, _| dut.last_try_available());

pub(crate) const RECOVERY_PIN_MATCHES: Guard =
    Guard::new("recovery_pin_matches", |dut, payload| {
        dut.awaiting_admin_recovery()
            && payload.pin.as_ref().is_some_and(|pin| dut.recovery_slot_for(pin).is_some())
    });

pub(crate) const RECOVERY_ATTEMPTS_EXHAUSTED_NEXT: Guard =
    Guard::new("recovery_attempts_exhausted_next", |dut, _| {
        dut.awaiting_admin_recovery() && dut.recovery_attempts_exhausted_next()
    });

pub(crate) const AWAITING_ADMIN_RECOVERY: Guard =
    Guard::new("awaiting_admin_recovery", |dut, _| dut.awaiting_admin_recovery());

pub(crate) const FORCED_ENROLLMENT_ACCEPTABLE: Guard =
    Guard::new("forced_enrollment_acceptable", |dut, payload| {
        dut.empty_user_slot_exists() && new_pin_acceptable(dut, payload, PendingEnrollment::User)
    });

pub(crate) const FORCED_ENROLLMENT_REJECTED: Guard =
    Guard::new("forced_enrollment_rejected", |dut, payload| {
        dut.empty_user_slot_exists() && payload.new_pin.is_some()
    });

pub(crate) const ENROLLMENT_ACCEPTABLE: Guard =
    Guard::new("enrollment_acceptable", |dut, payload| {
        dut.pending_enrollment().is_some_and(|kind| {
            dut.slot_available(kind) && new_pin_acceptable(dut, payload, kind)
        })
    });

pub(crate) const FIRST_ADMIN_REJECTED: Guard =
    Guard::new("first_admin_rejected", |dut, payload| {
        !dut.has_admin_pin() && payload.new_pin.is_some()
    });

pub(crate) const NEW_PIN_SUPPLIED: Guard =
    Guard::new("new_pin_supplied", |_, payload| payload.new_pin.is_some());

pub(crate) const COUNTER_ACCEPTABLE: Guard = Guard::new("counter_acceptable", |dut, payload| {
    match (dut.pending_counter(), payload.new_counter) {
        (Some(kind), Some(value)) => dut.counter_acceptable(kind, value),
        _ => false,
    }
});

pub(crate) const NEW_COUNTER_SUPPLIED: Guard =
    Guard::new("new_counter_supplied", |_, payload| payload.new_counter.is_some());

fn new_pin_acceptable(dut: &Dut, payload: &Payload, kind: PendingEnrollment) -> bool {
    payload.confirmation_matches()
        && payload.new_pin.as_ref().is_some_and(|pin| dut.pin_acceptable(pin, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dut::{CredentialClass, DeviceProfile, Feature},
        pin::Pin,
    };

    fn pin(digits: &str) -> Pin {
        Pin::new(digits).unwrap()
    }

    fn standby_dut() -> Dut {
        let mut dut =
            Dut::new(DeviceProfile { brute_force_max: 4, ..DeviceProfile::default() }).unwrap();
        dut.enroll_admin_pin(pin("1357924"));
        dut
    }

    #[test]
    fn midpoint_guard_fires_on_the_reaching_failure() {
        let mut dut = standby_dut();
        let none = Payload::none();
        assert!(!(FAILURE_REACHES_MIDPOINT.check)(&dut, &none));
        dut.record_failed_unlock(CredentialClass::Admin);
        assert!((FAILURE_REACHES_MIDPOINT.check)(&dut, &none));
    }

    #[test]
    fn recovery_login_needs_exhaustion_and_a_matching_pin() {
        let mut dut = standby_dut();
        dut.enroll_recovery_pin(pin("9081726"));
        let payload = Payload::pin(pin("9081726"));
        assert!(!(RECOVERY_PIN_MATCHES.check)(&dut, &payload));

        dut.set_feature(Feature::ProvisionLock, true);
        dut.exhaust_brute_force();
        assert!((RECOVERY_PIN_MATCHES.check)(&dut, &payload));
        assert!(!(RECOVERY_PIN_MATCHES.check)(&dut, &Payload::pin(pin("9081727"))));
    }

    #[test]
    fn enrollment_requires_matching_confirmation() {
        let mut dut = standby_dut();
        dut.begin_enrollment(PendingEnrollment::User);
        let good = Payload::new_pin(pin("2468013"));
        let mismatched =
            Payload { confirm_pin: Some(pin("2468014")), ..Payload::new_pin(pin("2468013")) };
        assert!((ENROLLMENT_ACCEPTABLE.check)(&dut, &good));
        assert!(!(ENROLLMENT_ACCEPTABLE.check)(&dut, &mismatched));
        assert!((NEW_PIN_SUPPLIED.check)(&dut, &mismatched));
    }

    #[test]
    fn user_slot_guard_reads_payload() {
        let mut dut = standby_dut();
        dut.enroll_user_pin(pin("2468013"));
        assert!((USER_SLOT_ENROLLED.check)(&dut, &Payload::user(1)));
        assert!(!(USER_SLOT_ENROLLED.check)(&dut, &Payload::user(2)));
        assert!(!(USER_SLOT_ENROLLED.check)(&dut, &Payload::none()));
    }
}
